/// Depth texture rendered from the spot light, sampled with a comparison sampler.
pub struct ShadowMap {
    pub depth_view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    resolution: u32,
}

pub const SHADOW_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

impl ShadowMap {
    /// Square map of `resolution` texels. A disabled shadow map still needs a
    /// 1x1 texture so the bind group layout stays the same.
    pub fn new(device: &wgpu::Device, resolution: u32) -> Self {
        let resolution = resolution.max(1);
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("shadow_map"),
            size: wgpu::Extent3d {
                width: resolution,
                height: resolution,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: SHADOW_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let depth_view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("shadow_map_view"),
            aspect: wgpu::TextureAspect::DepthOnly,
            ..Default::default()
        });

        // Linear filtering on a comparison sampler gives a 2x2 PCF per tap.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow_sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        Self {
            depth_view,
            sampler,
            resolution,
        }
    }

    pub fn resolution(&self) -> u32 {
        self.resolution
    }

    /// UV size of one texel, used as the PCF kernel step.
    pub fn texel_size(&self) -> f32 {
        texel_size(self.resolution)
    }

    pub fn memory_bytes(&self) -> u64 {
        // Depth32Float
        (self.resolution as u64) * (self.resolution as u64) * 4
    }
}

pub fn texel_size(resolution: u32) -> f32 {
    1.0 / resolution.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn texel_size_is_inverse_resolution() {
        assert_eq!(texel_size(1024), 1.0 / 1024.0);
        assert_eq!(texel_size(0), 1.0);
    }
}
