//! Legend and traced-instance clusters.

use super::nodes::font;
use super::{dedup_ordered, html_escape, Graph};
use crate::color::{Rgba, GREY, HIGHLIGHT_COLOR};
use crate::plots::fixed;
use crate::tree::{Prediction, TreeModel};

const LEGEND_FONT: u32 = 12;
const INSTANCE_FONT: u32 = 11;

/// Header and value cell of one instance column.
struct InstanceColumn {
    name: String,
    value: String,
    used: bool,
}

fn instance_cell(text: &str, color: Rgba, bold: bool) -> String {
    let text = if bold { format!("<b>{text}</b>") } else { text.to_string() };
    format!(
        r#"<td cellpadding="1" align="right" bgcolor="white"><font face="Helvetica" color="{}" point-size="{INSTANCE_FONT}">{text}</font></td>"#,
        color.to_hex()
    )
}

impl<M: TreeModel + ?Sized> Graph<'_, '_, M> {
    /// One swatch and name per class under a bold target header. Empty for regressors.
    pub(super) fn legend_cluster(&self) -> String {
        if !self.shadow.is_classifier() {
            return String::new();
        }
        let mut rows = String::new();
        for (image, name) in self.legend.iter().zip(self.class_names.values()) {
            rows.push_str(&format!(
                r#"                <tr>
                    <td border="0" cellspacing="0" cellpadding="0"><img src="{}"/></td>
                    <td align="left">{}</td>
                </tr>
"#,
                html_escape(&image.path.display().to_string()),
                font(&html_escape(name), LEGEND_FONT)
            ));
        }
        let header = font(&format!("<b>{}</b>", html_escape(self.target_name)), LEGEND_FONT);
        format!(
            r#"
    subgraph cluster_legend {{
        style=invis;
        legend [penwidth="0.3" margin="0" shape=box margin="0.03" width=.1, height=.1 label=<
            <table border="0" cellspacing="0" cellpadding="0">
                <tr>
                    <td border="0" colspan="2">{header}</td>
                </tr>
{rows}            </table>
        >]
    }}
"#
        )
    }

    /// Columns of the instance table: every feature, or only the ones the
    /// path tested followed by `...` when the instance is too wide.
    fn instance_columns(&self, x: &[f32], features_used: &[usize]) -> Vec<InstanceColumn> {
        let precision = self.config.precision;
        if x.len() > self.config.instance_feature_limit() {
            let mut columns: Vec<_> = dedup_ordered(features_used)
                .into_iter()
                .map(|f| InstanceColumn {
                    name: html_escape(self.shadow.feature_name(f)),
                    value: x.get(f).map(|&v| fixed(v, precision)).unwrap_or_default(),
                    used: true,
                })
                .collect();
            columns.push(InstanceColumn {
                name: "...".to_string(),
                value: "...".to_string(),
                used: false,
            });
            columns
        } else {
            x.iter()
                .enumerate()
                .map(|(f, &v)| InstanceColumn {
                    name: html_escape(self.shadow.feature_name(f)),
                    value: fixed(v, precision),
                    used: features_used.contains(&f),
                })
                .collect()
        }
    }

    /// Feature table of the traced instance, joined to its leaf by the prediction edge.
    pub(super) fn instance_cluster(&self) -> String {
        let (Some(x), Some((prediction, path))) = (&self.config.instance, self.highlight.trace()) else {
            return String::new();
        };
        let columns = self.instance_columns(x, path.features_used());
        let color = |used: bool| if used { HIGHLIGHT_COLOR } else { GREY };
        let headers: String = columns.iter().map(|c| instance_cell(&c.name, color(c.used), true)).collect();
        let values: String = columns.iter().map(|c| instance_cell(&c.value, color(c.used), false)).collect();

        let predicted = match *prediction {
            Prediction::Class(label) => self
                .class_names
                .get(&label)
                .map_or_else(|| label.to_string(), |name| html_escape(name)),
            Prediction::Value(v) => fixed(v, self.config.precision),
        };
        let edge_label = font(&format!(" Prediction<br/> {predicted}"), INSTANCE_FONT);

        format!(
            r#"
    subgraph cluster_instance {{
        style=invis;
        X_y [penwidth="0.3" margin="0" shape=box margin="0.03" width=.1, height=.1 label=<
            <table border="0" cellspacing="0" cellpadding="0">
                <tr>
                    {headers}
                </tr>
                <tr>
                    {values}
                </tr>
            </table>
        >]
    }}
    {leaf} -> X_y [dir=back; penwidth="1.2" color="{highlight}" label=<{edge_label}>]
"#,
            leaf = self.name(path.leaf()),
            highlight = HIGHLIGHT_COLOR.to_hex(),
        )
    }
}
