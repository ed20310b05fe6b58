//! Kana data: the romaji each kana is typed as, and the gojūon layout per mode.

use crate::controller::mode::Mode;
use crate::controller::pad_event::Direction;

/// One consonant row placed under a stick direction.
///
/// Cells follow the face-slot order (a, i, u, e, o columns). An empty cell
/// has no binding.
#[derive(Clone, Copy, Debug)]
pub struct GridRow {
    pub mode: Mode,
    pub direction: Direction,
    pub cells: [&'static str; 5],
}

const fn row(mode: Mode, direction: Direction, cells: [&'static str; 5]) -> GridRow {
    GridRow {
        mode,
        direction,
        cells,
    }
}

pub const GRID: [GridRow; 21] = [
    row(Mode::Plain, Direction::Center, ["あ", "い", "う", "え", "お"]),
    row(Mode::Plain, Direction::Up, ["か", "き", "く", "け", "こ"]),
    row(Mode::Plain, Direction::UpRight, ["さ", "し", "す", "せ", "そ"]),
    row(Mode::Plain, Direction::Right, ["た", "ち", "つ", "て", "と"]),
    row(Mode::Plain, Direction::DownRight, ["な", "に", "ぬ", "ね", "の"]),
    row(Mode::Plain, Direction::Down, ["は", "ひ", "ふ", "へ", "ほ"]),
    row(Mode::Plain, Direction::DownLeft, ["ま", "み", "む", "め", "も"]),
    row(Mode::Plain, Direction::Left, ["や", "", "ゆ", "", "よ"]),
    row(Mode::Plain, Direction::UpLeft, ["ら", "り", "る", "れ", "ろ"]),
    row(Mode::Plain, Direction::Press, ["わ", "を", "ん", "", ""]),
    row(Mode::Voiced, Direction::Up, ["が", "ぎ", "ぐ", "げ", "ご"]),
    row(Mode::Voiced, Direction::UpRight, ["ざ", "じ", "ず", "ぜ", "ぞ"]),
    row(Mode::Voiced, Direction::Right, ["だ", "ぢ", "づ", "で", "ど"]),
    row(Mode::Voiced, Direction::Down, ["ば", "び", "ぶ", "べ", "ぼ"]),
    // Digits share the semi-voiced page
    row(Mode::SemiVoiced, Direction::Center, ["0", "1", "2", "3", "4"]),
    row(Mode::SemiVoiced, Direction::Up, ["5", "6", "7", "8", "9"]),
    row(Mode::SemiVoiced, Direction::Down, ["ぱ", "ぴ", "ぷ", "ぺ", "ぽ"]),
    row(Mode::Compound, Direction::Center, ["ぁ", "ぃ", "ぅ", "ぇ", "ぉ"]),
    row(Mode::Compound, Direction::Right, ["", "", "っ", "", ""]),
    row(Mode::Compound, Direction::Left, ["ゃ", "", "ゅ", "", "ょ"]),
    row(Mode::Compound, Direction::Press, ["ゎ", "", "", "", ""]),
];

const ROMAJI: [(&str, &str); 91] = [
    ("0", "0"),
    ("1", "1"),
    ("2", "2"),
    ("3", "3"),
    ("4", "4"),
    ("5", "5"),
    ("6", "6"),
    ("7", "7"),
    ("8", "8"),
    ("9", "9"),
    ("あ", "a"),
    ("い", "i"),
    ("う", "u"),
    ("え", "e"),
    ("お", "o"),
    ("か", "ka"),
    ("き", "ki"),
    ("く", "ku"),
    ("け", "ke"),
    ("こ", "ko"),
    ("さ", "sa"),
    ("し", "shi"),
    ("す", "su"),
    ("せ", "se"),
    ("そ", "so"),
    ("た", "ta"),
    ("ち", "chi"),
    ("つ", "tu"),
    ("て", "te"),
    ("と", "to"),
    ("な", "na"),
    ("に", "ni"),
    ("ぬ", "nu"),
    ("ね", "ne"),
    ("の", "no"),
    ("は", "ha"),
    ("ひ", "hi"),
    ("ふ", "fu"),
    ("へ", "he"),
    ("ほ", "ho"),
    ("ま", "ma"),
    ("み", "mi"),
    ("む", "mu"),
    ("め", "me"),
    ("も", "mo"),
    ("や", "ya"),
    ("ゆ", "yu"),
    ("よ", "yo"),
    ("ら", "ra"),
    ("り", "ri"),
    ("る", "ru"),
    ("れ", "re"),
    ("ろ", "ro"),
    ("わ", "wa"),
    ("を", "wo"),
    ("ん", "nn"),
    ("が", "ga"),
    ("ぎ", "gi"),
    ("ぐ", "gu"),
    ("げ", "ge"),
    ("ご", "go"),
    ("ざ", "za"),
    ("じ", "zi"),
    ("ず", "zu"),
    ("ぜ", "ze"),
    ("ぞ", "zo"),
    ("だ", "da"),
    ("ぢ", "di"),
    ("づ", "du"),
    ("で", "de"),
    ("ど", "do"),
    ("ば", "ba"),
    ("び", "bi"),
    ("ぶ", "bu"),
    ("べ", "be"),
    ("ぼ", "bo"),
    ("ぱ", "pa"),
    ("ぴ", "pi"),
    ("ぷ", "pu"),
    ("ぺ", "pe"),
    ("ぽ", "po"),
    ("ぁ", "la"),
    ("ぃ", "li"),
    ("ぅ", "lu"),
    ("ぇ", "le"),
    ("ぉ", "lo"),
    ("っ", "ltu"),
    ("ゃ", "lya"),
    ("ゅ", "lyu"),
    ("ょ", "lyo"),
    ("ゎ", "lwa"),
];

/// Romaji typed for `kana`
pub fn romaji(kana: &str) -> Option<&'static str> {
    ROMAJI
        .iter()
        .find(|(k, _)| *k == kana)
        .map(|(_, romaji)| *romaji)
}
