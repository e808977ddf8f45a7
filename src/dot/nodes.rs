//! Node and edge statements.

use std::collections::{BTreeMap, BTreeSet};

use super::{html_escape, Graph};
use crate::artifact::Artifact;
use crate::color::{GREY, HIGHLIGHT_COLOR, YELLOW};
use crate::config::Orientation;
use crate::output::num;
use crate::plots::fixed;
use crate::sizing::leaf_disk_size;
use crate::tree::{Prediction, ShadowNode, ShadowTree, TreeModel};

const THIN_EDGE: &str = "0.3";
const THICK_EDGE: &str = "1.2";

/// DOT id of every node: `leaf{id}` for leaves, the cleaned feature name
/// followed by the id for splits.
///
/// Cleaning drops ASCII punctuation and turns whitespace into `_`. A split
/// falls back to `node{id}` when the cleaned name is empty, starts with a
/// digit, or collides with an earlier id, and a fallback that is itself
/// taken gets a `_{n}` suffix.
pub(crate) fn dot_names<M: TreeModel + ?Sized>(shadow: &ShadowTree<'_, M>) -> BTreeMap<usize, String> {
    let mut names = BTreeMap::new();
    let mut taken = BTreeSet::new();
    for node in shadow.leaves() {
        let name = format!("leaf{}", node.id());
        taken.insert(name.clone());
        names.insert(node.id(), name);
    }
    for node in shadow.internal() {
        let cleaned = node.feature().map(|f| clean_name(shadow.feature_name(f))).unwrap_or_default();
        let usable = cleaned.chars().next().is_some_and(|c| !c.is_ascii_digit());
        let mut name = format!("{cleaned}{}", node.id());
        if !usable || taken.contains(&name) {
            name = format!("node{}", node.id());
        }
        let base = name.clone();
        let mut suffix = 1;
        while taken.contains(&name) {
            name = format!("{base}_{suffix}");
            suffix += 1;
        }
        taken.insert(name.clone());
        names.insert(node.id(), name);
    }
    names
}

fn clean_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_ascii_punctuation())
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}

/// Single-cell table embedding a node image at its own size.
fn image_table(image: &Artifact, cell_border: bool) -> String {
    let border = if cell_border { "" } else { r#" CELLBORDER="0""# };
    format!(
        r#"<table border="0"{border}>
        <tr>
                <td port="img" fixedsize="true" width="{}" height="{}"><img src="{}"/></td>
        </tr>
        </table>"#,
        num(image.width),
        num(image.height),
        html_escape(&image.path.display().to_string())
    )
}

/// Grey Helvetica text at `size` points.
pub(super) fn font(text: &str, size: u32) -> String {
    format!(r#"<font face="Helvetica" color="{}" point-size="{size}">{text}</font>"#, GREY.to_hex())
}

impl<M: TreeModel + ?Sized> Graph<'_, '_, M> {
    /// Attributes of a node statement; highlighted nodes get a dashed box.
    fn node_attrs(&self, id: usize, shape: &str, label: &str) -> String {
        if self.highlight.contains(id) {
            format!(
                r#"[margin="0" shape=box penwidth=".5" color="{}" style="dashed" label=<{label}>]"#,
                HIGHLIGHT_COLOR.to_hex()
            )
        } else {
            format!(r#"[margin="0" shape={shape} label=<{label}>]"#)
        }
    }

    pub(super) fn split_node(&self, node: &ShadowNode) -> String {
        let label = match self.images.get(&node.id()) {
            Some(image) => image_table(image, true),
            None => {
                let name = node.feature().map_or("", |f| self.shadow.feature_name(f));
                let split = node.split().map(|s| fixed(s, self.config.precision)).unwrap_or_default();
                format!(
                    r#"<font face="Helvetica" color="{}" point-size="12">{}@{split}</font>"#,
                    GREY.to_hex(),
                    html_escape(name)
                )
            }
        };
        format!("    {} {}\n", self.name(node.id()), self.node_attrs(node.id(), "none", &label))
    }

    /// Both child edges of a split plus the block keeping the children on one rank.
    pub(super) fn split_edges(&self, node: &ShadowNode) -> String {
        let Some((left, right)) = node.children() else {
            return String::new();
        };
        let labelled = if node.id() == self.shadow.root().id() {
            self.config.show_root_edge_labels
        } else {
            self.config.show_edge_labels
        };
        let (llabel, rlabel) = if labelled { ("&lt;", "&ge;") } else { ("", "") };
        let (from, lname, rname) = (self.name(node.id()), self.name(left), self.name(right));

        let mut out = String::new();
        for (child, cname, label) in [(left, lname, llabel), (right, rname, rlabel)] {
            let (width, color) = if self.highlight.contains(child) {
                (THICK_EDGE, HIGHLIGHT_COLOR)
            } else {
                (THIN_EDGE, GREY)
            };
            out.push_str(&format!(
                "    {from} -> {cname} [penwidth={width} color=\"{}\" label=<{label}>]\n",
                color.to_hex()
            ));
        }
        out.push_str(&format!(
            "    {{\n        rank=same;\n        {lname} -> {rname} [style=invis]\n    }}\n"
        ));
        out
    }

    pub(super) fn leaf_node(&self, node: &ShadowNode) -> String {
        let name = self.name(node.id());
        match self.images.get(&node.id()) {
            Some(image) => {
                let table = image_table(image, !self.shadow.is_classifier());
                format!("    {name} {}\n", self.node_attrs(node.id(), "plain", &table))
            }
            None => self.plain_leaf(node),
        }
    }

    /// Yellow disk sized by sample count with the value and count beside it.
    fn plain_leaf(&self, node: &ShadowNode) -> String {
        let name = self.name(node.id());
        let width = leaf_disk_size(node.nsamples(), &self.shadow.leaf_sample_counts());
        let spacer_width = 0.15 / width;
        let labeldistance = match self.config.orientation {
            Orientation::TD => "1.2",
            Orientation::LR => "2.2",
        };
        let value = match self.shadow.prediction(node) {
            Prediction::Value(v) => fixed(v, self.config.precision),
            Prediction::Class(label) => label.to_string(),
        };
        let caption = format!("{}={value}", html_escape(self.target_name));
        let row = |text: &str| {
            format!(
                "            <tr>\n                <td align=\"center\" CELLPADDING=\"0\" CELLSPACING=\"0\">{}</td>\n            </tr>\n",
                font(text, 11)
            )
        };
        let label = format!(
            "<table border=\"0\" CELLPADDING=\"0\" CELLBORDER=\"0\" CELLSPACING=\"0\">\n{}{}            </table>",
            row(&caption),
            row(&format!("n={}", node.nsamples()))
        );

        let mut out = format!(
            "    {name} [fixedsize=\"true\" width=\"{width:.3}\" style=filled fillcolor=\"{}\" shape=circle label=\"\"]\n",
            YELLOW.to_hex()
        );
        out.push_str(&format!("    {name}_annot [shape=none width=\"{spacer_width:.3}\" label=\"\"]\n"));
        out.push_str(&format!("    {name}_spacer [shape=none label=\"\"]\n"));
        out.push_str(&format!(
            "    {name} -> {name}_annot [penwidth=0 arrowsize=0 labeldistance=\"{labeldistance}\" labelangle=\"0\" taillabel=<{label}>]\n"
        ));
        out.push_str(&format!(
            "    {{\n        rank=same;\n        {name} -> {name}_spacer [style=invis]\n    }}\n"
        ));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FeatureMatrix;
    use crate::tree::{TreeBuilder, TreeKind};

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("petal length (cm)"), "petal_length_cm");
        assert_eq!(clean_name("a.b-c"), "abc");
        assert_eq!(clean_name("\u{e9}t\u{e9}"), "\u{e9}t\u{e9}");
    }

    #[test]
    fn test_dot_names() {
        let x = FeatureMatrix::from_rows(&[[1.0, 1.0, 1.0], [3.0, 3.0, 3.0]]).unwrap();
        let mut b = TreeBuilder::new(TreeKind::Regressor, 3);
        b.add_split(0, 2.0, 1, 4, vec![2.0]);
        b.add_split(1, 2.0, 2, 3, vec![1.0]);
        b.add_leaf(vec![1.0]);
        b.add_leaf(vec![1.0]);
        b.add_split(2, 5.0, 5, 6, vec![3.0]);
        b.add_leaf(vec![3.0]);
        b.add_leaf(vec![3.0]);
        let model = b.build();
        let shadow = ShadowTree::new(&model, &x, &[1.0, 3.0], &["LSTAT", "2nd floor", "?!"]).unwrap();

        let names = dot_names(&shadow);
        assert_eq!(names[&0], "LSTAT0");
        assert_eq!(names[&1], "node1");
        assert_eq!(names[&4], "node4");
        assert_eq!(names[&2], "leaf2");
        assert_eq!(names[&6], "leaf6");
    }

    #[test]
    fn test_fallback_name_never_collides() {
        let x = FeatureMatrix::from_rows(&[[1.0, 1.0]]).unwrap();
        let mut b = TreeBuilder::new(TreeKind::Regressor, 2);
        for id in 0..12 {
            let feature = usize::from(id == 1);
            let right = if id == 11 { 24 } else { id + 1 };
            b.add_split(feature, 0.5, 12 + id, right, vec![1.0]);
        }
        for _ in 12..=24 {
            b.add_leaf(vec![1.0]);
        }
        let model = b.build();
        let shadow = ShadowTree::new(&model, &x, &[1.0], &["9x", "node1"]).unwrap();

        let names = dot_names(&shadow);
        assert_eq!(names[&1], "node11");
        assert_eq!(names[&11], "node11_1");
        let unique: BTreeSet<&String> = names.values().collect();
        assert_eq!(unique.len(), names.len());
    }

    #[test]
    fn test_image_table() {
        let image = Artifact {
            path: "/tmp/x/node3.svg".into(),
            width: 237.6,
            height: 64.5,
        };
        let table = image_table(&image, false);
        assert!(table.starts_with(r#"<table border="0" CELLBORDER="0">"#));
        assert!(table.contains(r#"width="237.6" height="64.5"><img src="/tmp/x/node3.svg"/>"#));
        assert!(image_table(&image, true).starts_with(r#"<table border="0">"#));
    }
}
