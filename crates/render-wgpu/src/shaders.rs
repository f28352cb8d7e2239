/// Number of material slots in the palette uniform.
pub const MATERIAL_COUNT: usize = 28;

/// Base colour per material id. Door material `9 + k` and key material
/// `19 + k` share a colour so a key visibly matches its doors.
#[rustfmt::skip]
pub const MATERIAL_PALETTE: [[f32; 4]; MATERIAL_COUNT] = [
    [0.55, 0.53, 0.50, 1.0], // 0 wall
    [0.45, 0.35, 0.25, 1.0], // 1..7 decorations
    [0.30, 0.45, 0.30, 1.0],
    [0.60, 0.55, 0.40, 1.0],
    [0.35, 0.35, 0.45, 1.0],
    [0.50, 0.30, 0.30, 1.0],
    [0.40, 0.50, 0.55, 1.0],
    [0.65, 0.60, 0.55, 1.0],
    [0.20, 0.20, 0.22, 1.0], // 8 ceiling
    [0.90, 0.20, 0.20, 1.0], // 9..16 doors
    [0.20, 0.70, 0.25, 1.0],
    [0.20, 0.35, 0.90, 1.0],
    [0.95, 0.85, 0.20, 1.0],
    [0.80, 0.30, 0.85, 1.0],
    [0.20, 0.80, 0.85, 1.0],
    [0.95, 0.55, 0.15, 1.0],
    [0.95, 0.95, 0.95, 1.0],
    [0.75, 0.05, 0.05, 1.0], // 17 hostile
    [0.35, 0.30, 0.28, 1.0], // 18 border decoration
    [0.90, 0.20, 0.20, 1.0], // 19..26 keys
    [0.20, 0.70, 0.25, 1.0],
    [0.20, 0.35, 0.90, 1.0],
    [0.95, 0.85, 0.20, 1.0],
    [0.80, 0.30, 0.85, 1.0],
    [0.20, 0.80, 0.85, 1.0],
    [0.95, 0.55, 0.15, 1.0],
    [0.95, 0.95, 0.95, 1.0],
    [0.28, 0.25, 0.22, 1.0], // 27 ground
];

/// WGSL for instanced maze geometry: palette colour, sun light and a
/// camera-mounted spot light.
pub const MAZE_SHADER: &str = r#"
struct Frame {
    view_proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    // xyz direction, w intensity (0 when off)
    flashlight_dir: vec4<f32>,
    // x cos(cone half-angle), y range
    flashlight: vec4<f32>,
    palette: array<vec4<f32>, 28>,
};

@group(0) @binding(0)
var<uniform> frame: Frame;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct InstanceInput {
    @location(3) model_0: vec4<f32>,
    @location(4) model_1: vec4<f32>,
    @location(5) model_2: vec4<f32>,
    @location(6) model_3: vec4<f32>,
    @location(7) normal_0: vec4<f32>,
    @location(8) normal_1: vec4<f32>,
    @location(9) normal_2: vec4<f32>,
    // material, mesh, first_index, first_vertex
    @location(10) ids: vec4<u32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) @interpolate(flat) material: u32,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let normal_matrix = mat3x3<f32>(
        instance.normal_0.xyz,
        instance.normal_1.xyz,
        instance.normal_2.xyz,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);

    var out: VertexOutput;
    out.clip_position = frame.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = normalize(normal_matrix * vertex.normal);
    out.uv = vertex.uv;
    out.material = instance.ids.x;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let base = frame.palette[min(in.material, 27u)].rgb;
    let cell = vec2<i32>(floor(in.uv * 4.0));
    let checker = select(0.9, 1.0, (cell.x + cell.y) % 2 == 0);
    let n = normalize(in.world_normal);

    let sun_dir = normalize(vec3<f32>(0.3, 1.0, 0.5));
    var light = 0.15 + 0.35 * max(dot(n, sun_dir), 0.0);

    let to_frag = in.world_pos - frame.camera_pos.xyz;
    let dist = length(to_frag);
    if (frame.flashlight_dir.w > 0.0 && dist > 0.0) {
        let dir = to_frag / dist;
        let cone = frame.flashlight.x;
        let spot = smoothstep(cone, min(cone + 0.05, 1.0), dot(dir, frame.flashlight_dir.xyz));
        let falloff = clamp(1.0 - dist / frame.flashlight.y, 0.0, 1.0);
        light += 2.0 * frame.flashlight_dir.w * spot * falloff * max(dot(n, -dir), 0.0);
    }

    return vec4<f32>(base * checker * light, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_match_their_doors() {
        for k in 0..8 {
            assert_eq!(MATERIAL_PALETTE[9 + k], MATERIAL_PALETTE[19 + k]);
        }
    }

    #[test]
    fn shader_palette_size_matches() {
        assert!(MAZE_SHADER.contains(&format!("array<vec4<f32>, {MATERIAL_COUNT}>")));
    }
}
