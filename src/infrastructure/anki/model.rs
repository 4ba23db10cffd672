//! ドイツ語単語カードのノートタイプ定義とフィールド整形

use crate::domain::WordEntry;
use html_escape::encode_text;
use serde_json::{Value, json};

pub const MODEL_NAME: &str = "German Vocabulary Model";

/// フィールド名 (順序がそのまま Anki 上の ord になる)
pub const FIELD_NAMES: [&str; 5] = ["German", "English", "Examples", "Notes", "Audio"];

pub struct CardTemplate {
    pub name: &'static str,
    pub qfmt: &'static str,
    pub afmt: &'static str,
    /// このテンプレートのカード生成に必要なフィールド ord
    pub required_field: usize,
}

pub const TEMPLATES: [CardTemplate; 2] = [
    CardTemplate {
        name: "German -> English",
        qfmt: r#"<div class="german">{{German}}</div>{{Audio}}"#,
        afmt: r#"{{FrontSide}}<hr id="answer"><div class="english">{{English}}</div><br><div class="notes">{{Notes}}</div><br><div class="examples">{{Examples}}</div>"#,
        required_field: 0,
    },
    CardTemplate {
        name: "English -> German",
        qfmt: r#"<div class="english">{{English}}</div>"#,
        afmt: r#"{{FrontSide}}<hr id="answer"><div class="german">{{German}}</div>{{Audio}}<br><div class="notes">{{Notes}}</div><br><div class="examples">{{Examples}}</div>"#,
        required_field: 1,
    },
];

pub const CSS: &str = r#".card {
    font-family: arial;
    font-size: 20px;
    text-align: center;
    color: black;
    background-color: white;
}
.german {
    font-weight: bold;
    color: #3399ff;
}
.english {
    font-style: italic;
}
.examples {
    text-align: left;
    margin: 15px;
}"#;

const LATEX_PRE: &str = "\\documentclass[12pt]{article}\n\\special{papersize=3in,5in}\n\\usepackage[utf8]{inputenc}\n\\usepackage{amssymb,amsmath}\n\\pagestyle{empty}\n\\setlength{\\parindent}{0in}\n\\begin{document}\n";
const LATEX_POST: &str = "\\end{document}";

/// `col.models` に入るノートタイプの JSON
pub fn model_json(model_id: i64, deck_id: i64, modified: i64) -> Value {
    let flds: Vec<Value> = FIELD_NAMES
        .iter()
        .enumerate()
        .map(|(ord, name)| {
            json!({
                "name": name,
                "ord": ord,
                "sticky": false,
                "rtl": false,
                "font": "Arial",
                "size": 20,
                "media": [],
            })
        })
        .collect();
    let tmpls: Vec<Value> = TEMPLATES
        .iter()
        .enumerate()
        .map(|(ord, t)| {
            json!({
                "name": t.name,
                "ord": ord,
                "qfmt": t.qfmt,
                "afmt": t.afmt,
                "bqfmt": "",
                "bafmt": "",
                "did": null,
            })
        })
        .collect();
    let req: Vec<Value> = TEMPLATES
        .iter()
        .enumerate()
        .map(|(ord, t)| json!([ord, "any", [t.required_field]]))
        .collect();

    json!({
        "id": model_id,
        "name": MODEL_NAME,
        "type": 0,
        "mod": modified,
        "usn": -1,
        "sortf": 0,
        "did": deck_id,
        "tmpls": tmpls,
        "flds": flds,
        "css": CSS,
        "latexPre": LATEX_PRE,
        "latexPost": LATEX_POST,
        "tags": [],
        "vers": [],
        "req": req,
    })
}

/// `[sound:...]` タグ
pub fn sound_tag(file_name: &str) -> String {
    format!("[sound:{}]", file_name)
}

/// エントリをノートのフィールド値へ変換する。
///
/// 音声ファイル名は `media_names` で解決済みのもの (重複回避後) を使う。
/// `media_names[0]` が見出し語、以降が例文に対応する。
pub fn note_fields(entry: &WordEntry, media_names: &[Option<String>]) -> Vec<String> {
    let german = encode_text(&entry.headword).into_owned();
    let english = encode_text(&entry.translation).into_owned();

    let examples = entry
        .examples
        .iter()
        .enumerate()
        .map(|(i, ex)| {
            let audio = media_names
                .get(i + 1)
                .and_then(|n| n.as_deref())
                .map(|n| format!(" {}", sound_tag(n)))
                .unwrap_or_default();
            format!(
                "<b>{}. {}</b>{}<br><i>{}</i>",
                i + 1,
                encode_text(&ex.text),
                audio,
                encode_text(&ex.translation)
            )
        })
        .collect::<Vec<_>>()
        .join("<br><br>");

    let notes = entry
        .grammar
        .notes(&entry.part_of_speech, &entry.headword)
        .iter()
        .map(|n| encode_text(n).into_owned())
        .collect::<Vec<_>>()
        .join(" | ");

    let audio = media_names
        .first()
        .and_then(|n| n.as_deref())
        .map(sound_tag)
        .unwrap_or_default();

    vec![german, english, examples, notes, audio]
}
