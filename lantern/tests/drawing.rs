use lantern::buffer::{Buffer, BufferKind};
use lantern::context::GraphicsContext as _;
use lantern::mock::{Call, Fault, MockContext};
use lantern::render::{IndexType, Mode, RenderError};
use lantern::shader::Program;
use lantern::vertex::{AttribType, VertexArray, VertexAttrib};

const VS: &str = "#version 330 core
layout (location = 0) in vec3 aPos;
layout (location = 1) in vec3 aColor;
layout (location = 2) in vec2 aTex;
void main() { gl_Position = vec4(aPos, 1.0); }
";

const FS: &str = "#version 330 core
out vec4 FragColor;
uniform sampler2D tex0;
void main() { FragColor = vec4(1.0); }
";

#[rustfmt::skip]
const QUAD_VERTICES: [f32; 32] = [
  -0.5, -0.5, 0.0,   1.0, 0.0, 0.0,   0.0, 0.0,
  -0.5,  0.5, 0.0,   0.0, 1.0, 0.0,   0.0, 1.0,
   0.5,  0.5, 0.0,   0.0, 0.0, 1.0,   1.0, 1.0,
   0.5, -0.5, 0.0,   1.0, 1.0, 1.0,   1.0, 0.0,
];

const QUAD_INDICES: [u32; 6] = [0, 2, 1, 0, 3, 2];

#[test]
fn quad_is_one_indexed_draw() {
  let mut ctx = MockContext::new();
  let program = Program::from_strings(&mut ctx, VS, FS).unwrap();
  let mut vao = VertexArray::new(&mut ctx).unwrap();
  let vbo = Buffer::from_slice(&mut ctx, BufferKind::Vertex, &QUAD_VERTICES).unwrap();
  let ebo = Buffer::from_slice(&mut ctx, BufferKind::Index, &QUAD_INDICES).unwrap();

  let stride = 8 * 4;
  vao
    .link_attrib(&vbo, VertexAttrib::new(0, 3, AttribType::F32, stride, 0))
    .unwrap();
  vao
    .link_attrib(&vbo, VertexAttrib::new(1, 3, AttribType::F32, stride, 12))
    .unwrap();
  vao
    .link_attrib(&vbo, VertexAttrib::new(2, 2, AttribType::F32, stride, 24))
    .unwrap();
  vao.set_index_buffer(&ebo).unwrap();
  vao.unbind();
  ctx.clear_calls();

  program.activate();
  ctx
    .draw_indexed(&vao, Mode::Triangles, QUAD_INDICES.len(), IndexType::U32)
    .unwrap();

  let draws: Vec<_> = ctx
    .calls()
    .into_iter()
    .filter(|c| matches!(c, Call::DrawElements { .. } | Call::DrawArrays { .. }))
    .collect();

  assert_eq!(
    draws,
    vec![Call::DrawElements {
      mode: Mode::Triangles,
      count: 6,
      index_type: IndexType::U32,
    }]
  );
  assert!(ctx.faults().is_empty());
}

#[test]
fn attributes_within_their_buffer_never_fault() {
  let types = [AttribType::F32, AttribType::I32, AttribType::U32, AttribType::U8];

  for &ty in &types {
    for components in 1..=4u8 {
      for &padding in &[0usize, 4, 12] {
        for &offset in &[0usize, 4, 16] {
          for &vert_nb in &[1usize, 3, 7] {
            let footprint = components as usize * ty.bytes();
            let stride = if padding == 0 { 0 } else { footprint + padding };
            let attrib = VertexAttrib::new(0, components, ty, stride, offset);
            let len = attrib.required_len(vert_nb);

            let mut ctx = MockContext::new();
            let program = Program::from_strings(&mut ctx, VS, FS).unwrap();
            let vbo = Buffer::new(&mut ctx, BufferKind::Vertex, &vec![0; len]).unwrap();
            let mut vao = VertexArray::new(&mut ctx).unwrap();
            vao.link_attrib(&vbo, attrib).unwrap();

            program.activate();
            ctx.draw_arrays(&vao, Mode::Points, 0, vert_nb).unwrap();

            let indices: Vec<u32> = (0..vert_nb as u32).collect();
            let ebo = Buffer::from_slice(&mut ctx, BufferKind::Index, &indices).unwrap();
            vao.set_index_buffer(&ebo).unwrap();
            ctx
              .draw_indexed(&vao, Mode::Points, vert_nb, IndexType::U32)
              .unwrap();

            assert!(
              ctx.faults().is_empty(),
              "{:?} with {} vertices: {:?}",
              attrib,
              vert_nb,
              ctx.faults()
            );
          }
        }
      }
    }
  }
}

#[test]
fn indices_past_the_vertex_buffer_fault() {
  let mut ctx = MockContext::new();
  let program = Program::from_strings(&mut ctx, VS, FS).unwrap();
  let vbo = Buffer::from_slice(&mut ctx, BufferKind::Vertex, &[0f32; 9]).unwrap();
  let ebo = Buffer::from_slice(&mut ctx, BufferKind::Index, &[0u16, 1, 3]).unwrap();
  let mut vao = VertexArray::new(&mut ctx).unwrap();
  vao
    .link_attrib(&vbo, VertexAttrib::new(0, 3, AttribType::F32, 0, 0))
    .unwrap();
  vao.set_index_buffer(&ebo).unwrap();

  program.activate();
  ctx
    .draw_indexed(&vao, Mode::Triangles, 3, IndexType::U16)
    .unwrap();

  assert!(matches!(
    ctx.faults()[..],
    [Fault::OutOfBounds {
      slot: 0,
      needed: 48,
      len: 36,
      ..
    }]
  ));
}

#[test]
fn non_indexed_overflow_is_rejected_before_drawing() {
  let mut ctx = MockContext::new();
  let vbo = Buffer::from_slice(&mut ctx, BufferKind::Vertex, &[0f32; 6]).unwrap();
  let mut vao = VertexArray::new(&mut ctx).unwrap();
  vao
    .link_attrib(&vbo, VertexAttrib::new(0, 3, AttribType::F32, 0, 0))
    .unwrap();
  ctx.clear_calls();

  let r = ctx.draw_arrays(&vao, Mode::Triangles, 0, 3);

  assert_eq!(
    r,
    Err(RenderError::VertexOverflow {
      slot: 0,
      needed: 36,
      available: 24
    })
  );
  assert!(ctx.calls().is_empty());
}

#[test]
fn indexed_draw_checks_the_index_buffer() {
  let mut ctx = MockContext::new();
  let mut vao = VertexArray::new(&mut ctx).unwrap();

  assert_eq!(
    ctx.draw_indexed(&vao, Mode::Triangles, 3, IndexType::U32),
    Err(RenderError::NoIndexBuffer)
  );

  let ebo = Buffer::from_slice(&mut ctx, BufferKind::Index, &[0u32, 1, 2]).unwrap();
  vao.set_index_buffer(&ebo).unwrap();

  assert_eq!(
    ctx.draw_indexed(&vao, Mode::Triangles, 4, IndexType::U32),
    Err(RenderError::IndexOverflow {
      requested: 4,
      available: 3
    })
  );
}

#[test]
fn draw_rebinds_its_vertex_array() {
  let mut ctx = MockContext::new();
  let program = Program::from_strings(&mut ctx, VS, FS).unwrap();
  let vbo = Buffer::from_slice(&mut ctx, BufferKind::Vertex, &[0f32; 9]).unwrap();
  let ebo = Buffer::from_slice(&mut ctx, BufferKind::Index, &[0u8, 1, 2]).unwrap();
  let mut vao = VertexArray::new(&mut ctx).unwrap();
  vao
    .link_attrib(&vbo, VertexAttrib::new(0, 3, AttribType::F32, 0, 0))
    .unwrap();
  vao.set_index_buffer(&ebo).unwrap();

  // something else is bound in between
  let other = VertexArray::new(&mut ctx).unwrap();
  other.bind();

  program.activate();
  ctx
    .draw_indexed(&vao, Mode::Triangles, 3, IndexType::U8)
    .unwrap();

  assert!(ctx.faults().is_empty());
}

#[test]
fn released_buffer_is_reported_at_draw_time() {
  let mut ctx = MockContext::new();
  let program = Program::from_strings(&mut ctx, VS, FS).unwrap();
  let vbo = Buffer::from_slice(&mut ctx, BufferKind::Vertex, &[0f32; 9]).unwrap();
  let mut vao = VertexArray::new(&mut ctx).unwrap();
  vao
    .link_attrib(&vbo, VertexAttrib::new(0, 3, AttribType::F32, 0, 0))
    .unwrap();

  vbo.release();
  program.activate();
  // the layout still remembers the old length, so only the backend catches this
  ctx.draw_arrays(&vao, Mode::Triangles, 0, 3).unwrap();

  assert!(matches!(
    ctx.faults()[..],
    [Fault::DanglingBuffer { slot: Some(0), .. }]
  ));
}

#[test]
fn frame_commands_are_recorded_in_order() {
  let mut ctx = MockContext::new();

  ctx.set_viewport([0, 0, 800, 600]);
  ctx.set_depth_test(true);
  ctx.clear([0.07, 0.13, 0.17, 1.], true);

  assert_eq!(
    ctx.calls(),
    vec![
      Call::Viewport {
        viewport: [0, 0, 800, 600]
      },
      Call::DepthTest { enabled: true },
      Call::Clear {
        color: [0.07, 0.13, 0.17, 1.],
        depth: true
      },
    ]
  );
}
