//! Plain-text outline backend.

use std::io::Write;

use anyhow::Result;
use passblock_rendering::{OutlineRenderer, Scene};

/// Writes every captured group as indented text.
#[derive(Debug)]
pub(crate) struct TextRenderer<W> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    pub(crate) fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> OutlineRenderer for TextRenderer<W> {
    fn render(&mut self, scene: &Scene) -> Result<()> {
        if scene.frames.is_empty() {
            writeln!(self.out, "no groups")?;
        }

        for frame in &scene.frames {
            let members: Vec<String> = frame
                .members
                .iter()
                .map(|member| member.get().to_string())
                .collect();
            writeln!(
                self.out,
                "group {}: origin ({}, {}) size {}x{} members [{}]",
                frame.group.get(),
                frame.origin.x,
                frame.origin.y,
                frame.size.x,
                frame.size.y,
                members.join(", ")
            )?;

            for stroke in &frame.strokes {
                writeln!(
                    self.out,
                    "  edge ({}, {}) -> ({}, {}) normal ({}, {}) length {} phase {:.3}",
                    stroke.start.x,
                    stroke.start.y,
                    stroke.end.x,
                    stroke.end.y,
                    stroke.normal.x,
                    stroke.normal.y,
                    stroke.length(),
                    stroke.wobble_phase
                )?;
            }
            for accent in &frame.accents {
                writeln!(
                    self.out,
                    "  corner ({}, {}) {:?}",
                    accent.tile.x, accent.tile.y, accent.kinds
                )?;
            }
        }

        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passblock_core::{BlockId, Command, GroupingKey, Rect};
    use passblock_rendering::Color;
    use passblock_world::{self as world, World};

    #[test]
    fn single_block_prints_four_edges_and_one_corner() {
        let mut world = World::new();
        let mut events = Vec::new();
        world::apply(
            &mut world,
            Command::SpawnBlock {
                region: Rect::new(0, 0, 64, 64),
                key: GroupingKey::default(),
            },
            &mut events,
        );
        world::apply(
            &mut world,
            Command::ActivateBlock {
                block: BlockId::new(0),
            },
            &mut events,
        );

        let mut renderer = TextRenderer::new(Vec::new());
        renderer
            .render(&Scene::capture(&world, Color::from_rgb_u8(0, 0, 0)))
            .expect("rendering into memory succeeds");
        let bytes = renderer.into_inner();
        let text = String::from_utf8(bytes).expect("utf-8 output");
        let header = text.lines().next().expect("header line");

        assert_eq!(header, "group 0: origin (0, 0) size 64x64 members [0]");
        assert_eq!(count_lines(&text, "edge"), 4);
        assert_eq!(count_lines(&text, "length 64"), 4);
        assert_eq!(count_lines(&text, "corner"), 4);
    }

    fn count_lines(text: &str, needle: &str) -> usize {
        text.lines().filter(|line| line.contains(needle)).count()
    }

    #[test]
    fn empty_scene_says_so() {
        let mut renderer = TextRenderer::new(Vec::new());
        renderer
            .render(&Scene::default())
            .expect("rendering into memory succeeds");

        assert_eq!(renderer.into_inner(), b"no groups\n");
    }
}
