use crate::types::BarGroup;

pub const DEFAULT_WIDTH: usize = 80;

/// Draws one bar of the group as a three-line strip `width` columns wide,
/// scaled to its original length. Cuts are boxed and labelled, the leftover
/// is dotted.
pub fn render_bar(group: &BarGroup, width: usize) -> String {
    let original = group.original_length().mm();
    if original == 0 || width == 0 {
        return String::new();
    }
    let scale = width as f64 / original as f64;
    let to_col = |mm: u32| (mm as f64 * scale).round() as usize;

    let mut edge = vec!['-'; width + 1];
    let mut body = vec![' '; width + 1];
    mark_boundary(&mut edge, &mut body, 0);
    mark_boundary(&mut edge, &mut body, width);

    let cuts = group.cuts();
    let used = original.saturating_sub(group.remaining.mm());
    // Whatever is used beyond the pieces themselves went to the saw.
    let kerf = match cuts.len() as u32 {
        0 => 0,
        n => used.saturating_sub(group.cut_total().mm()) / n,
    };

    let mut pos = 0u32;
    for cut in cuts {
        let end_mm = pos.saturating_add(cut.mm());
        let start = to_col(pos).min(width);
        let end = to_col(end_mm).min(width);
        mark_boundary(&mut edge, &mut body, end);
        put_label(&mut body, start, end, &cut.to_string());
        pos = end_mm.saturating_add(kerf);
    }

    for cell in body.iter_mut().take(width).skip(to_col(used) + 1) {
        *cell = '.';
    }

    let edge: String = edge.into_iter().collect();
    let body: String = body.into_iter().collect();
    format!("{edge}\n{body}\n{edge}\n")
}

fn mark_boundary(edge: &mut [char], body: &mut [char], x: usize) {
    if x < edge.len() {
        edge[x] = '+';
        body[x] = '|';
    }
}

/// Centres the label strictly between two boundaries, or skips it when the
/// segment is too narrow.
fn put_label(body: &mut [char], start: usize, end: usize, label: &str) {
    let chars: Vec<char> = label.chars().collect();
    if end <= start + chars.len() + 1 {
        return;
    }
    let from = (start + end) / 2 - chars.len() / 2;
    for (i, &ch) in chars.iter().enumerate() {
        let x = from + i;
        if x > start && x < end {
            body[x] = ch;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Length, OriginKind, Signature};

    fn group(original: f64, cuts: &[f64], remaining: f64) -> BarGroup {
        BarGroup {
            signature: Signature {
                origin: OriginKind::New,
                original_length: Length::from_cm(original),
                cuts: cuts.iter().map(|&c| Length::from_cm(c)).collect(),
            },
            count: 1,
            remaining: Length::from_cm(remaining),
            ids: vec!["new-1".to_string()],
            all_instances_metadata: vec![vec![Default::default(); cuts.len()]],
        }
    }

    #[test]
    fn test_render_two_cuts_with_leftover() {
        let output = render_bar(&group(1200.0, &[300.0, 300.0], 600.0), DEFAULT_WIDTH);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], lines[2]);
        assert_eq!(lines[1].matches("300").count(), 2);
        assert!(lines[1].contains("...."));
        // outer edges plus one boundary after each cut
        assert_eq!(lines[0].matches('+').count(), 4);
    }

    #[test]
    fn test_render_full_bar_has_no_leftover() {
        let output = render_bar(&group(1200.0, &[400.0, 400.0, 400.0], 0.0), DEFAULT_WIDTH);
        assert!(!output.contains('.'));
        assert_eq!(output.matches("400").count(), 3);
    }

    #[test]
    fn test_render_narrow_cut_skips_label() {
        let output = render_bar(&group(1200.0, &[10.0], 1190.0), DEFAULT_WIDTH);
        assert!(!output.contains("10 "));
        assert!(output.contains('.'));
    }

    #[test]
    fn test_render_custom_width() {
        let output = render_bar(&group(1200.0, &[300.0, 300.0], 600.0), 40);
        let lines: Vec<&str> = output.lines().collect();
        assert!(lines.iter().all(|l| l.chars().count() == 41));
        // boundaries after each 300 cut land at columns 10 and 20
        assert_eq!(lines[0].find('+'), Some(0));
        assert_eq!(&lines[0][10..11], "+");
        assert_eq!(&lines[0][20..21], "+");
        assert_eq!(lines[1].matches("300").count(), 2);
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render_bar(&group(0.0, &[], 0.0), DEFAULT_WIDTH), "");
    }
}
