/// Side length of one sketch bitmap.
pub const IMG_SIZE: usize = 28;

/// Pixels per flattened sketch bitmap.
pub const IMG_PIXELS: usize = IMG_SIZE * IMG_SIZE;

/// Number of classification targets.
pub const NUM_CLASSES: usize = CATEGORIES.len();

/// The fixed label space, in classification-index order.
///
/// This order is the sole join key between training targets, the final
/// layer's output units and the `labels.json` array. Reordering it
/// silently relabels every prediction, so it must never change within
/// one export.
const CATEGORIES: [(&str, &str); 33] = [
    ("cat", "ねこ"),
    ("dog", "いぬ"),
    ("rabbit", "うさぎ"),
    ("elephant", "ぞう"),
    ("fish", "さかな"),
    ("bird", "とり"),
    ("snake", "へび"),
    ("lion", "ライオン"),
    ("penguin", "ペンギン"),
    ("bear", "くま"),
    ("frog", "カエル"),
    ("butterfly", "ちょうちょ"),
    ("apple", "りんご"),
    ("banana", "バナナ"),
    ("cake", "ケーキ"),
    ("pizza", "ピザ"),
    ("ice cream", "アイス"),
    ("car", "くるま"),
    ("train", "でんしゃ"),
    ("airplane", "ひこうき"),
    ("bicycle", "じてんしゃ"),
    ("house", "いえ"),
    ("tree", "き（木）"),
    ("flower", "はな"),
    ("sun", "たいよう"),
    ("star", "ほし"),
    ("umbrella", "かさ"),
    ("clock", "とけい"),
    ("book", "ほん"),
    ("key", "かぎ"),
    ("snowman", "ゆきだるま"),
    ("smiley face", "かお"),
    ("mushroom", "キノコ"),
];

/// One classification label with its stable ordinal index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub index: usize,
    pub en: &'static str,
    pub ja: &'static str,
}

impl Category {
    /// File name of this category's sample store entry: the english key
    /// with spaces replaced by underscores, plus `.npy`.
    pub fn file_name(&self) -> String {
        format!("{}.npy", self.en.replace(' ', "_"))
    }
}

/// All categories in classification-index order.
pub fn categories() -> impl ExactSizeIterator<Item = Category> {
    CATEGORIES
        .iter()
        .enumerate()
        .map(|(index, &(en, ja))| Category { index, en, ja })
}
