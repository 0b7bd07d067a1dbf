//! Flickrのライセンス・カラーコード一覧
//!
//! フィルタ初期値として使う。呼び出すたびに未チェックの新しいコピーを返す。

use crate::filters::FilterOption;

const LICENSES: &[(&str, &str)] = &[
    ("0", "All Rights Reserved"),
    ("4", "Attribution License"),
    ("6", "Attribution-NoDerivs License"),
    ("3", "Attribution-NonCommercial-NoDerivs License"),
    ("2", "Attribution-NonCommercial License"),
    ("1", "Attribution-NonCommercial-ShareAlike License"),
    ("5", "Attribution-ShareAlike License"),
    ("7", "No known copyright restrictions"),
    ("8", "United States Government Work"),
    ("9", "Public Domain Dedication (CC0)"),
    ("10", "Public Domain Mark"),
];

const COLORS: &[(&str, &str)] = &[
    ("0", "Red"),
    ("1", "Dark"),
    ("2", "Orange"),
    ("b", "Pale"),
    ("4", "Lemon"),
    ("5", "Green"),
    ("6", "Dark"),
    ("7", "Cyan"),
    ("8", "Blue"),
    ("9", "Violet"),
    ("a", "Pink"),
    ("c", "White"),
    ("d", "Gray"),
    ("e", "Black"),
];

/// ライセンス一覧（全て未チェック）
pub fn licenses() -> Vec<FilterOption> {
    to_options(LICENSES)
}

/// カラーコード一覧（全て未チェック）
pub fn colors() -> Vec<FilterOption> {
    to_options(COLORS)
}

fn to_options(entries: &[(&str, &str)]) -> Vec<FilterOption> {
    entries
        .iter()
        .map(|(id, label)| FilterOption::new(*id, *label))
        .collect()
}
