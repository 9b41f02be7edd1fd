use js_sys::{Float32Array, Object, Reflect, Uint16Array};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram, WebGlShader,
    WebGlUniformLocation, WebGlVertexArrayObject,
};

use crate::camera::Viewport;
use crate::clock::FrameSink;
use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::scene::SceneContext;
use crate::theme::Rgb;

/// Opacity of the proximity lines.
const LINE_OPACITY: f32 = 0.04;

const POINT_VS: &str = r#"#version 300 es
layout(location = 0) in vec3 position;
layout(location = 1) in vec3 color;
layout(location = 2) in float size;
uniform mat4 uProjection;
uniform mat4 uModelView;
uniform float uPixelRatio;
uniform float uTime;
out vec3 vColor;
out float vAlpha;

void main() {
    vColor = color;
    vec4 mvPosition = uModelView * vec4(position, 1.0);
    float dist = length(mvPosition.xyz);
    vAlpha = 1.0 - smoothstep(10.0, 60.0, dist);
    gl_PointSize = size * uPixelRatio * (200.0 / dist);
    gl_Position = uProjection * mvPosition;
}
"#;

const POINT_FS: &str = r#"#version 300 es
precision mediump float;
in vec3 vColor;
in float vAlpha;
out vec4 fragColor;

void main() {
    float dist = length(gl_PointCoord - vec2(0.5));
    if (dist > 0.5) discard;
    float alpha = (1.0 - smoothstep(0.0, 0.5, dist)) * vAlpha;
    fragColor = vec4(vColor, alpha * 0.8);
}
"#;

const LINE_VS: &str = r#"#version 300 es
layout(location = 0) in vec3 position;
uniform mat4 uProjection;
uniform mat4 uModelView;

void main() {
    gl_Position = uProjection * uModelView * vec4(position, 1.0);
}
"#;

const LINE_FS: &str = r#"#version 300 es
precision mediump float;
uniform vec3 uColor;
uniform float uOpacity;
out vec4 fragColor;

void main() {
    fragColor = vec4(uColor, uOpacity);
}
"#;

struct PointProgram {
    program: WebGlProgram,
    projection: Option<WebGlUniformLocation>,
    model_view: Option<WebGlUniformLocation>,
    pixel_ratio: Option<WebGlUniformLocation>,
    // The driver may strip it; setting a missing uniform is a no-op.
    time: Option<WebGlUniformLocation>,
}

struct LineProgram {
    program: WebGlProgram,
    projection: Option<WebGlUniformLocation>,
    model_view: Option<WebGlUniformLocation>,
    color: Option<WebGlUniformLocation>,
    opacity: Option<WebGlUniformLocation>,
}

struct SolidMesh {
    vao: WebGlVertexArrayObject,
    index_count: i32,
}

/// Line geometry uploaded from the latest connection pass.
struct LineMesh {
    vao: WebGlVertexArrayObject,
    buffer: WebGlBuffer,
    vertex_count: i32,
}

/// WebGL2 output for a [`SceneContext`].
pub struct Renderer {
    gl: GL,
    canvas: HtmlCanvasElement,
    points: PointProgram,
    lines: LineProgram,
    particle_vao: WebGlVertexArrayObject,
    position_buffer: WebGlBuffer,
    color_buffer: WebGlBuffer,
    size_buffer: WebGlBuffer,
    particle_count: i32,
    solids: Vec<SolidMesh>,
    /// Set once the first frame has uploaded the static geometry.
    uploaded: bool,
    connections: Option<LineMesh>,
    connections_generation: Option<u64>,
    viewport: Option<Viewport>,
}

impl Renderer {
    pub fn new(canvas: HtmlCanvasElement, config: &SceneConfig, viewport: Viewport) -> Result<Self, SceneError> {
        let gl = context(&canvas, config).ok_or(SceneError::ContextUnavailable)?;
        gl.clear_color(0.0, 0.0, 0.0, 0.0);

        let program = link_program(&gl, POINT_VS, POINT_FS)?;
        let points = PointProgram {
            projection: gl.get_uniform_location(&program, "uProjection"),
            model_view: gl.get_uniform_location(&program, "uModelView"),
            pixel_ratio: gl.get_uniform_location(&program, "uPixelRatio"),
            time: gl.get_uniform_location(&program, "uTime"),
            program,
        };
        let program = link_program(&gl, LINE_VS, LINE_FS)?;
        let lines = LineProgram {
            projection: gl.get_uniform_location(&program, "uProjection"),
            model_view: gl.get_uniform_location(&program, "uModelView"),
            color: gl.get_uniform_location(&program, "uColor"),
            opacity: gl.get_uniform_location(&program, "uOpacity"),
            program,
        };

        let particle_vao = gl.create_vertex_array().ok_or(SceneError::ContextUnavailable)?;
        let position_buffer = gl.create_buffer().ok_or(SceneError::ContextUnavailable)?;
        let color_buffer = gl.create_buffer().ok_or(SceneError::ContextUnavailable)?;
        let size_buffer = gl.create_buffer().ok_or(SceneError::ContextUnavailable)?;
        gl.bind_vertex_array(Some(&particle_vao));
        attribute(&gl, &position_buffer, 0, 3);
        attribute(&gl, &color_buffer, 1, 3);
        attribute(&gl, &size_buffer, 2, 1);
        gl.bind_vertex_array(None);

        let mut renderer = Self {
            gl,
            canvas,
            points,
            lines,
            particle_vao,
            position_buffer,
            color_buffer,
            size_buffer,
            particle_count: 0,
            solids: Vec::new(),
            uploaded: false,
            connections: None,
            connections_generation: None,
            viewport: None,
        };
        renderer.sync_size(viewport)?;
        Ok(renderer)
    }

    /// Resizes the backing store and CSS box when the viewport changed.
    fn sync_size(&mut self, viewport: Viewport) -> Result<(), JsValue> {
        if self.viewport == Some(viewport) {
            return Ok(());
        }
        let (w, h) = viewport.drawing_buffer_size();
        self.canvas.set_width(w);
        self.canvas.set_height(h);
        let style = self.canvas.style();
        style.set_property("width", &format!("{}px", viewport.width))?;
        style.set_property("height", &format!("{}px", viewport.height))?;
        self.gl.viewport(0, 0, w as i32, h as i32);
        self.viewport = Some(viewport);
        Ok(())
    }

    /// Uploads everything that only depends on scene construction.
    fn upload_static(&mut self, scene: &SceneContext) -> Result<(), SceneError> {
        let gl = &self.gl;
        let particles = scene.particles();
        self.particle_count = particles.len() as i32;

        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&self.position_buffer));
        gl.buffer_data_with_array_buffer_view(
            GL::ARRAY_BUFFER,
            &Float32Array::from(particles.positions()),
            GL::DYNAMIC_DRAW,
        );
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&self.color_buffer));
        gl.buffer_data_with_array_buffer_view(
            GL::ARRAY_BUFFER,
            &Float32Array::from(particles.colors()),
            GL::DYNAMIC_DRAW,
        );
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&self.size_buffer));
        gl.buffer_data_with_array_buffer_view(
            GL::ARRAY_BUFFER,
            &Float32Array::from(particles.sizes()),
            GL::STATIC_DRAW,
        );

        for solid in scene.solids() {
            let vao = gl.create_vertex_array().ok_or(SceneError::ContextUnavailable)?;
            let vertices = gl.create_buffer().ok_or(SceneError::ContextUnavailable)?;
            let indices = gl.create_buffer().ok_or(SceneError::ContextUnavailable)?;
            gl.bind_vertex_array(Some(&vao));
            gl.bind_buffer(GL::ARRAY_BUFFER, Some(&vertices));
            gl.buffer_data_with_array_buffer_view(
                GL::ARRAY_BUFFER,
                &Float32Array::from(solid.wireframe.vertices.as_slice()),
                GL::STATIC_DRAW,
            );
            attribute(gl, &vertices, 0, 3);
            gl.bind_buffer(GL::ELEMENT_ARRAY_BUFFER, Some(&indices));
            gl.buffer_data_with_array_buffer_view(
                GL::ELEMENT_ARRAY_BUFFER,
                &Uint16Array::from(solid.wireframe.indices.as_slice()),
                GL::STATIC_DRAW,
            );
            gl.bind_vertex_array(None);
            self.solids.push(SolidMesh {
                vao,
                index_count: solid.wireframe.indices.len() as i32,
            });
        }
        Ok(())
    }

    /// Replaces the line mesh after a connection pass. The old buffer is
    /// deleted first, also when the new pass found nothing.
    fn sync_connections(&mut self, scene: &SceneContext) -> Result<(), SceneError> {
        let connections = scene.connections();
        if self.connections_generation == Some(connections.generation()) {
            return Ok(());
        }
        self.connections_generation = Some(connections.generation());

        let gl = &self.gl;
        if let Some(old) = self.connections.take() {
            gl.delete_buffer(Some(&old.buffer));
            gl.delete_vertex_array(Some(&old.vao));
        }
        let Some(segments) = connections.segments() else {
            return Ok(());
        };

        let vao = gl.create_vertex_array().ok_or(SceneError::ContextUnavailable)?;
        let buffer = gl.create_buffer().ok_or(SceneError::ContextUnavailable)?;
        gl.bind_vertex_array(Some(&vao));
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));
        gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &Float32Array::from(segments), GL::STATIC_DRAW);
        attribute(gl, &buffer, 0, 3);
        gl.bind_vertex_array(None);
        self.connections = Some(LineMesh {
            vao,
            buffer,
            vertex_count: (segments.len() / 3) as i32,
        });
        Ok(())
    }

    fn draw(&mut self, scene: &mut SceneContext) -> Result<(), JsValue> {
        if !self.uploaded {
            self.upload_static(scene)?;
            self.uploaded = true;
        }
        self.sync_size(scene.viewport())?;
        self.sync_connections(scene)?;

        let gl = &self.gl;
        let projection = scene.camera().projection().to_cols_array();
        let view = scene.camera().view();
        let cloud_mv = (view * scene.cloud_matrix()).to_cols_array();

        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&self.position_buffer));
        gl.buffer_sub_data_with_i32_and_array_buffer_view(
            GL::ARRAY_BUFFER,
            0,
            &Float32Array::from(scene.particles().positions()),
        );
        if scene.particles_mut().take_colors_dirty() {
            gl.bind_buffer(GL::ARRAY_BUFFER, Some(&self.color_buffer));
            gl.buffer_sub_data_with_i32_and_array_buffer_view(
                GL::ARRAY_BUFFER,
                0,
                &Float32Array::from(scene.particles().colors()),
            );
        }

        gl.clear(GL::COLOR_BUFFER_BIT);
        gl.enable(GL::BLEND);
        gl.depth_mask(false);

        // Wireframes: plain alpha blending.
        gl.use_program(Some(&self.lines.program));
        gl.blend_func(GL::SRC_ALPHA, GL::ONE_MINUS_SRC_ALPHA);
        gl.uniform_matrix4fv_with_f32_array(self.lines.projection.as_ref(), false, &projection);
        for (mesh, solid) in self.solids.iter().zip(scene.solids()) {
            let mv = (view * solid.model_matrix()).to_cols_array();
            gl.uniform_matrix4fv_with_f32_array(self.lines.model_view.as_ref(), false, &mv);
            set_color(gl, self.lines.color.as_ref(), solid.color);
            gl.uniform1f(self.lines.opacity.as_ref(), solid.opacity);
            gl.bind_vertex_array(Some(&mesh.vao));
            gl.draw_elements_with_i32(GL::LINES, mesh.index_count, GL::UNSIGNED_SHORT, 0);
        }

        // Connections and particles add light.
        gl.blend_func(GL::SRC_ALPHA, GL::ONE);
        if let Some(mesh) = &self.connections {
            // Lines sit in world space; only the points follow the cloud transform.
            gl.uniform_matrix4fv_with_f32_array(self.lines.model_view.as_ref(), false, &view.to_cols_array());
            set_color(gl, self.lines.color.as_ref(), scene.line_color());
            gl.uniform1f(self.lines.opacity.as_ref(), LINE_OPACITY);
            gl.bind_vertex_array(Some(&mesh.vao));
            gl.draw_arrays(GL::LINES, 0, mesh.vertex_count);
        }

        gl.use_program(Some(&self.points.program));
        gl.uniform_matrix4fv_with_f32_array(self.points.projection.as_ref(), false, &projection);
        gl.uniform_matrix4fv_with_f32_array(self.points.model_view.as_ref(), false, &cloud_mv);
        gl.uniform1f(self.points.pixel_ratio.as_ref(), scene.pixel_ratio() as f32);
        gl.uniform1f(self.points.time.as_ref(), scene.time());
        gl.bind_vertex_array(Some(&self.particle_vao));
        gl.draw_arrays(GL::POINTS, 0, self.particle_count);

        gl.bind_vertex_array(None);
        Ok(())
    }
}

impl FrameSink for Renderer {
    fn present(&mut self, scene: &mut SceneContext) {
        if let Err(e) = self.draw(scene) {
            log::error!("render error: {e:?}");
        }
    }
}

fn context(canvas: &HtmlCanvasElement, config: &SceneConfig) -> Option<GL> {
    let options = Object::new();
    let set = |key: &str, value: JsValue| Reflect::set(&options, &JsValue::from_str(key), &value).ok();
    set("antialias", JsValue::from_bool(config.antialias));
    set("alpha", JsValue::TRUE);
    set("powerPreference", JsValue::from_str(config.tier.power_preference()));
    canvas
        .get_context_with_context_options("webgl2", &options)
        .ok()
        .flatten()?
        .dyn_into::<GL>()
        .ok()
}

fn attribute(gl: &GL, buffer: &WebGlBuffer, location: u32, components: i32) {
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(buffer));
    gl.enable_vertex_attrib_array(location);
    gl.vertex_attrib_pointer_with_i32(location, components, GL::FLOAT, false, 0, 0);
}

fn set_color(gl: &GL, location: Option<&WebGlUniformLocation>, color: Rgb) {
    gl.uniform3f(location, color.r, color.g, color.b);
}

fn compile_shader(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader, SceneError> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| SceneError::Shader("unable to create shader object".into()))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);
    if gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(SceneError::Shader(log))
    }
}

fn link_program(gl: &GL, vertex: &str, fragment: &str) -> Result<WebGlProgram, SceneError> {
    let vs = compile_shader(gl, GL::VERTEX_SHADER, vertex)?;
    let fs = compile_shader(gl, GL::FRAGMENT_SHADER, fragment)?;
    let program = gl
        .create_program()
        .ok_or_else(|| SceneError::Shader("unable to create program".into()))?;
    gl.attach_shader(&program, &vs);
    gl.attach_shader(&program, &fs);
    gl.link_program(&program);
    gl.delete_shader(Some(&vs));
    gl.delete_shader(Some(&fs));
    if gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        Err(SceneError::Shader(gl.get_program_info_log(&program).unwrap_or_default()))
    }
}
