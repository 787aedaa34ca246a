//! Run classification and script merging
//!
//! Question banks authored before native math support carry superscripts and
//! subscripts as vertically-aligned runs: `10` followed by a superscript
//! `-19` run means 10⁻¹⁹. This module tags each run's tokens with its
//! alignment, then merges adjacent (base, script) pairs into `<msup>`/
//! `<msub>` markup. A scripted fragment with no qualifying base degrades to
//! plain literal text.

use crate::math::omml::escape_text;
use crate::math::symbols;

use super::super::models::{Paragraph, RunFragment, RunItem, VertAlign};

/// Produce the merged text of one paragraph
pub(crate) fn paragraph_text(para: &Paragraph) -> String {
    merge_scripts(&collect_fragments(para))
}

/// Walk the paragraph's runs in document order, tagging every non-empty
/// text/symbol token with its run's alignment. The alignment is decided once
/// per run.
pub(crate) fn collect_fragments(para: &Paragraph) -> Vec<RunFragment> {
    let mut fragments = Vec::new();

    for run in &para.runs {
        let kind = run.vert_align;
        for item in &run.items {
            let text = match item {
                RunItem::Text(text) => text.clone(),
                RunItem::Symbol { font, code } => match symbols::lookup(font, code) {
                    Some(unicode) => unicode.to_string(),
                    // Unknown symbols stay visible rather than vanishing.
                    None => format!("[{}]", code.to_ascii_uppercase()),
                },
            };
            if !text.is_empty() {
                fragments.push(RunFragment { kind, text });
            }
        }
    }

    fragments
}

/// Single left-to-right pass merging (base, script) fragment pairs.
///
/// A superscript claims the trailing decimal digits of the preceding normal
/// fragment as its base; a subscript claims the trailing ASCII letters. The
/// script value is always wrapped as `<mn>`, even when alphabetic.
pub(crate) fn merge_scripts(fragments: &[RunFragment]) -> String {
    let mut out = String::new();
    let mut pending: Option<String> = None;

    for fragment in fragments {
        match fragment.kind {
            VertAlign::Normal => {
                if let Some(prev) = pending.take() {
                    out.push_str(&prev);
                }
                pending = Some(fragment.text.clone());
            }
            VertAlign::Superscript => {
                merge_one(&mut out, &mut pending, fragment, |c| c.is_ascii_digit())
            }
            VertAlign::Subscript => {
                merge_one(&mut out, &mut pending, fragment, |c| c.is_ascii_alphabetic())
            }
        }
    }

    if let Some(prev) = pending.take() {
        out.push_str(&prev);
    }
    out
}

fn merge_one(
    out: &mut String,
    pending: &mut Option<String>,
    script: &RunFragment,
    base_class: fn(char) -> bool,
) {
    let Some(prev) = pending.take() else {
        // Script with no preceding normal text: plain literal.
        out.push_str(&script.text);
        return;
    };

    let tail: usize = prev
        .chars()
        .rev()
        .take_while(|&c| base_class(c))
        .map(char::len_utf8)
        .sum();

    if tail == 0 {
        // No qualifying base run; both fragments stay literal.
        out.push_str(&prev);
        out.push_str(&script.text);
        return;
    }

    let (prefix, base) = prev.split_at(prev.len() - tail);
    out.push_str(prefix);
    let script_text = escape_text(&script.text);
    match script.kind {
        VertAlign::Superscript => {
            out.push_str(&format!(
                "<math><msup><mn>{base}</mn><mn>{script_text}</mn></msup></math>"
            ));
        }
        VertAlign::Subscript => {
            out.push_str(&format!(
                "<math><msub><mi>{base}</mi><mn>{script_text}</mn></msub></math>"
            ));
        }
        VertAlign::Normal => unreachable!("merge_one is only called for scripted fragments"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::models::Run;

    fn frag(kind: VertAlign, text: &str) -> RunFragment {
        RunFragment {
            kind,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_superscript_merge() {
        let fragments = [
            frag(VertAlign::Normal, "10"),
            frag(VertAlign::Superscript, "-19"),
        ];
        assert_eq!(
            merge_scripts(&fragments),
            "<math><msup><mn>10</mn><mn>-19</mn></msup></math>",
            "no residual bare base text may precede the markup"
        );
    }

    #[test]
    fn test_superscript_merge_keeps_prefix() {
        let fragments = [
            frag(VertAlign::Normal, "charge of 10"),
            frag(VertAlign::Superscript, "-19"),
            frag(VertAlign::Normal, " C"),
        ];
        assert_eq!(
            merge_scripts(&fragments),
            "charge of <math><msup><mn>10</mn><mn>-19</mn></msup></math> C"
        );
    }

    #[test]
    fn test_subscript_merge_claims_trailing_letters() {
        let fragments = [frag(VertAlign::Normal, "v"), frag(VertAlign::Subscript, "x")];
        assert_eq!(
            merge_scripts(&fragments),
            "<math><msub><mi>v</mi><mn>x</mn></msub></math>"
        );
    }

    #[test]
    fn script_merge_wraps_alpha_subscript_as_mn() {
        // Pins the historical behavior: the script value is <mn> even when
        // alphabetic. See DESIGN.md before changing this.
        let fragments = [frag(VertAlign::Normal, "v"), frag(VertAlign::Subscript, "x")];
        assert!(merge_scripts(&fragments).contains("<mn>x</mn>"));
    }

    #[test]
    fn test_unmatched_script_stays_literal() {
        // Superscript needs trailing digits; "mc" ends in a letter.
        let fragments = [
            frag(VertAlign::Normal, "E=mc"),
            frag(VertAlign::Superscript, "2"),
        ];
        assert_eq!(merge_scripts(&fragments), "E=mc2");
    }

    #[test]
    fn test_script_without_base_stays_literal() {
        let fragments = [frag(VertAlign::Superscript, "2")];
        assert_eq!(merge_scripts(&fragments), "2");
    }

    #[test]
    fn test_all_digit_base_fully_claimed() {
        let fragments = [
            frag(VertAlign::Normal, "1024"),
            frag(VertAlign::Superscript, "8"),
        ];
        assert_eq!(
            merge_scripts(&fragments),
            "<math><msup><mn>1024</mn><mn>8</mn></msup></math>"
        );
    }

    #[test]
    fn test_normal_fragments_pass_through() {
        let fragments = [
            frag(VertAlign::Normal, "just "),
            frag(VertAlign::Normal, "text"),
        ];
        assert_eq!(merge_scripts(&fragments), "just text");
    }

    #[test]
    fn test_collect_fragments_symbol_fallback() {
        let para = Paragraph {
            runs: vec![Run {
                vert_align: VertAlign::Normal,
                items: vec![
                    RunItem::Symbol {
                        font: "Symbol".to_string(),
                        code: "f070".to_string(),
                    },
                    RunItem::Symbol {
                        font: "Symbol".to_string(),
                        code: "F0FF".to_string(),
                    },
                ],
            }],
            ..Default::default()
        };

        let fragments = collect_fragments(&para);
        assert_eq!(fragments[0].text, "π");
        assert_eq!(fragments[1].text, "[F0FF]", "unknown symbols stay visible");
    }

    #[test]
    fn test_paragraph_text_merges_across_runs() {
        let para = Paragraph {
            runs: vec![
                Run {
                    vert_align: VertAlign::Normal,
                    items: vec![RunItem::Text("10".to_string())],
                },
                Run {
                    vert_align: VertAlign::Superscript,
                    items: vec![RunItem::Text("-19".to_string())],
                },
            ],
            ..Default::default()
        };
        assert_eq!(
            paragraph_text(&para),
            "<math><msup><mn>10</mn><mn>-19</mn></msup></math>"
        );
    }
}
