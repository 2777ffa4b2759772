/// Per-frame uniform block shared by both passes. Must match `FrameUniforms` in gpu.rs.
macro_rules! frame_uniforms {
    () => {
        r#"
struct Frame {
    view_proj: mat4x4<f32>,
    model: mat4x4<f32>,
    light_view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    // rgb = linear albedo, a = metalness
    base_color: vec4<f32>,
    // rgb = emissive, a = roughness
    emissive: vec4<f32>,
    // xyz = position, w = range
    spot_pos: vec4<f32>,
    // xyz = direction, w = cos(outer cone)
    spot_dir: vec4<f32>,
    // rgb = color * intensity, w = cos(inner cone)
    spot_color: vec4<f32>,
    // rgb = color * intensity
    ambient: vec4<f32>,
    // x = texel size, y = depth bias, z = receive shadow, w = double sided
    shadow: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> frame: Frame;
"#
    };
}

/// WGSL shader for the wireframe cloth.
pub const CLOTH_SHADER: &str = concat!(
    frame_uniforms!(),
    r#"
@group(0) @binding(1)
var shadow_map: texture_depth_2d;
@group(0) @binding(2)
var shadow_sampler: sampler_comparison;

const PI: f32 = 3.14159265;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) light_clip: vec4<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world = frame.model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = frame.view_proj * world;
    out.world_pos = world.xyz;
    out.world_normal = normalize((frame.model * vec4<f32>(vertex.normal, 0.0)).xyz);
    out.light_clip = frame.light_view_proj * world;
    return out;
}

fn shadow_factor(light_clip: vec4<f32>) -> f32 {
    if (frame.shadow.z < 0.5 || light_clip.w <= 0.0) {
        return 1.0;
    }
    let ndc = light_clip.xyz / light_clip.w;
    let uv = vec2<f32>(ndc.x * 0.5 + 0.5, -ndc.y * 0.5 + 0.5);
    if (any(uv < vec2<f32>(0.0)) || any(uv > vec2<f32>(1.0)) || ndc.z > 1.0) {
        return 1.0;
    }
    let depth = ndc.z - frame.shadow.y;

    // 3x3 taps, each a hardware 2x2 comparison.
    var lit = 0.0;
    for (var x = -1; x <= 1; x = x + 1) {
        for (var y = -1; y <= 1; y = y + 1) {
            let offset = vec2<f32>(f32(x), f32(y)) * frame.shadow.x;
            lit = lit + textureSampleCompareLevel(shadow_map, shadow_sampler, uv + offset, depth);
        }
    }
    return lit / 9.0;
}

fn distribution_ggx(n_dot_h: f32, roughness: f32) -> f32 {
    let a = roughness * roughness;
    let a2 = a * a;
    let d = n_dot_h * n_dot_h * (a2 - 1.0) + 1.0;
    return a2 / (PI * d * d);
}

fn geometry_schlick(n_dot_x: f32, k: f32) -> f32 {
    return n_dot_x / (n_dot_x * (1.0 - k) + k);
}

fn fresnel_schlick(cos_theta: f32, f0: vec3<f32>) -> vec3<f32> {
    return f0 + (vec3<f32>(1.0) - f0) * pow(1.0 - cos_theta, 5.0);
}

fn spot_cone(cos_theta: f32) -> f32 {
    let outer = frame.spot_dir.w;
    let inner = frame.spot_color.w;
    if (inner - outer < 1e-4) {
        return step(outer, cos_theta);
    }
    return smoothstep(outer, inner, cos_theta);
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let albedo = frame.base_color.rgb;
    let metalness = frame.base_color.a;
    let roughness = clamp(frame.emissive.a, 0.04, 1.0);

    var n = normalize(in.world_normal);
    let v = normalize(frame.camera_pos.xyz - in.world_pos);
    if (frame.shadow.w > 0.5 && dot(n, v) < 0.0) {
        n = -n;
    }

    let to_light = frame.spot_pos.xyz - in.world_pos;
    let dist = length(to_light);
    let l = to_light / max(dist, 1e-4);
    let cone = spot_cone(dot(-l, normalize(frame.spot_dir.xyz)));
    var falloff = 1.0;
    if (frame.spot_pos.w > 0.0) {
        falloff = clamp(1.0 - dist / frame.spot_pos.w, 0.0, 1.0);
    }
    // Legacy light units: intensity is irradiance / PI.
    let radiance = frame.spot_color.rgb * cone * falloff * PI;

    let h = normalize(v + l);
    let n_dot_l = max(dot(n, l), 0.0);
    let n_dot_v = max(dot(n, v), 1e-4);
    let n_dot_h = max(dot(n, h), 0.0);
    let v_dot_h = max(dot(v, h), 0.0);

    let f0 = mix(vec3<f32>(0.04), albedo, metalness);
    let f = fresnel_schlick(v_dot_h, f0);
    let k = (roughness + 1.0) * (roughness + 1.0) / 8.0;
    let g = geometry_schlick(n_dot_v, k) * geometry_schlick(n_dot_l, k);
    let specular = distribution_ggx(n_dot_h, roughness) * g * f / (4.0 * n_dot_v * n_dot_l + 1e-4);
    let kd = (vec3<f32>(1.0) - f) * (1.0 - metalness);
    let diffuse = kd * albedo / PI;

    let direct = (diffuse + specular) * radiance * n_dot_l * shadow_factor(in.light_clip);
    let ambient = frame.ambient.rgb * albedo * (1.0 - metalness);
    return vec4<f32>(direct + ambient + frame.emissive.rgb, 1.0);
}
"#
);

/// WGSL shader for the depth-only pass from the spot light.
pub const SHADOW_SHADER: &str = concat!(
    frame_uniforms!(),
    r#"
@vertex
fn vs_shadow(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return frame.light_view_proj * frame.model * vec4<f32>(position, 1.0);
}
"#
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shaders_share_the_uniform_block() {
        for src in [CLOTH_SHADER, SHADOW_SHADER] {
            assert!(src.contains("var<uniform> frame: Frame;"));
            assert!(src.contains("light_view_proj: mat4x4<f32>"));
        }
    }

    #[test]
    fn entry_points_exist() {
        assert!(CLOTH_SHADER.contains("fn vs_main("));
        assert!(CLOTH_SHADER.contains("fn fs_main("));
        assert!(SHADOW_SHADER.contains("fn vs_shadow("));
        assert!(!SHADOW_SHADER.contains("shadow_map"));
    }
}
