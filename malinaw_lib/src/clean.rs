//! Text cleaning applied to every modal row before it is matched.

use std::sync::LazyLock;

use regex::Regex;

/// C0 controls, DEL, and C1 controls. The site leaks vertical tabs and
/// similar characters into cell text.
static INVISIBLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\u{0000}-\u{001F}\u{007F}-\u{009F}]").expect("invalid regex: invisible")
});

const NBSP: char = '\u{00a0}';
const REPLACEMENT: char = '\u{fffd}';
/// The site serves "ñ" in a broken encoding; it always arrives as U+FFFD.
const ENYE: char = '\u{00f1}';

/// Normalizes raw row text.
///
/// Strips control characters, turns non-breaking spaces into spaces, maps the
/// replacement character back to "ñ", trims, and removes one pair of
/// surrounding double quotes.
pub fn clean_text(raw: &str) -> String {
    let stripped = INVISIBLE.replace_all(raw, "");
    let replaced: String = stripped
        .chars()
        .map(|c| match c {
            NBSP => ' ',
            REPLACEMENT => ENYE,
            other => other,
        })
        .collect();

    let trimmed = replaced.trim();
    match trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
    {
        Some(inner) => inner.trim().to_string(),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_controls_and_maps_replacement_char() {
        assert_eq!(clean_text("\u{000b}\u{00a0}Leyte\u{fffd}"), "Leyteñ");
    }

    #[test]
    fn removes_c1_controls_inside_text() {
        assert_eq!(clean_text("DATE\u{0085} FILED\u{009f} : 2023"), "DATE FILED : 2023");
    }

    #[test]
    fn nbsp_inside_text_becomes_space() {
        assert_eq!(clean_text("FULL\u{00a0}TITLE : X"), "FULL TITLE : X");
    }

    #[test]
    fn strips_one_pair_of_quotes() {
        assert_eq!(clean_text("\"AN ACT\""), "AN ACT");
        assert_eq!(clean_text("  \"AN ACT\"\n"), "AN ACT");
    }

    #[test]
    fn lone_quote_is_kept() {
        assert_eq!(clean_text("\""), "\"");
        assert_eq!(clean_text("\"AN ACT"), "\"AN ACT");
    }

    #[test]
    fn cleaning_is_idempotent() {
        let samples = [
            "\u{000b}\u{00a0}Leyte\u{fffd}",
            "  \"FULL TITLE : AN ACT\u{00a0}\"  ",
            "SIGNIFICANCE:\tNATIONAL\r\n",
            "Dasmari\u{fffd}as City",
            "",
            "plain",
        ];
        for sample in samples {
            let once = clean_text(sample);
            assert_eq!(clean_text(&once), once, "not idempotent for {:?}", sample);
        }
    }
}
