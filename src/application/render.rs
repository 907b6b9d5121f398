//! Tree display of a partner forest.

use termtree::GlyphPalette;

use crate::domain::{Forest, TreeNode};

/// Levels drawn in full; deeper nodes keep only the innermost levels after a marker.
pub const MAX_INDENT_DEPTH: usize = 32;

const ELIDED_MARKER: &str = "… ";

/// Converts a forest into printable lines, roots in input order.
pub trait ForestDisplay {
    fn display_lines(&self) -> Vec<String>;
}

fn label(node: &TreeNode) -> String {
    if node.data.total_commission > 0.0 {
        format!("{} ({:.2})", node.data, node.data.total_commission)
    } else {
        node.data.to_string()
    }
}

impl ForestDisplay for Forest {
    /// One line per partner from the pre-order walk, with tree glyphs.
    ///
    /// Output is flat so arbitrarily deep chains neither recurse nor grow
    /// quadratically.
    fn display_lines(&self) -> Vec<String> {
        let glyphs = GlyphPalette::new();
        // is-last-child flag per ancestor level below the root
        let mut last_flags: Vec<bool> = Vec::new();
        let mut lines = Vec::with_capacity(self.len());

        for (idx, node, depth) in self.iter() {
            if depth == 0 {
                last_flags.clear();
                lines.push(label(node));
                continue;
            }
            last_flags.truncate(depth - 1);
            let is_last = node
                .parent
                .and_then(|parent| self.get_node(parent))
                .and_then(|parent| parent.children.last())
                .map_or(true, |&last| last == idx);

            let mut line = String::new();
            let shown = last_flags.len().saturating_sub(MAX_INDENT_DEPTH - 1);
            if shown > 0 {
                line.push_str(ELIDED_MARKER);
            }
            for &ancestor_last in &last_flags[shown..] {
                line.push_str(if ancestor_last {
                    glyphs.last_skip
                } else {
                    glyphs.middle_skip
                });
                line.push_str(glyphs.skip_indent);
            }
            line.push_str(if is_last {
                glyphs.last_item
            } else {
                glyphs.middle_item
            });
            line.push_str(glyphs.item_indent);
            line.push_str(&label(node));

            lines.push(line);
            last_flags.push(is_last);
        }
        lines
    }
}
