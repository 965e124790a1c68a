//! テキストフィット
//!
//! 描画面の計測関数 `measure(text, font_size) -> width` を使って、
//! ボックスに収まる最大フォントサイズを探す。
//!
//! - 1行モード: 2px刻みで縮小、下限サイズで打ち切り
//! - 折り返しモード: 単語単位の貪欲折り返し（長すぎる単語は単独行、ハイフネーションなし）

use serde::{Deserialize, Serialize};

/// フォントサイズの縮小幅（px）
pub const FONT_STEP: f32 = 2.0;

/// テキストの配置モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextMode {
    /// 1行に収まるまで縮小
    #[serde(alias = "shrink")]
    SingleLine,
    /// 単語単位で折り返し
    #[default]
    Wrap,
}

impl std::str::FromStr for TextMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single-line" | "single" | "shrink" => Ok(TextMode::SingleLine),
            "wrap" => Ok(TextMode::Wrap),
            _ => Err(format!("Unknown text mode: {}. Use wrap or shrink", s)),
        }
    }
}

impl std::fmt::Display for TextMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TextMode::SingleLine => write!(f, "shrink"),
            TextMode::Wrap => write!(f, "wrap"),
        }
    }
}

/// フィット結果
#[derive(Debug, Clone, PartialEq)]
pub enum FitResult {
    SingleLine { font_size: f32 },
    Wrapped { font_size: f32, lines: Vec<String> },
}

impl FitResult {
    pub fn font_size(&self) -> f32 {
        match self {
            FitResult::SingleLine { font_size } | FitResult::Wrapped { font_size, .. } => *font_size,
        }
    }
}

/// 1行で収まる最大サイズを探す
///
/// `start_size` から2pxずつ下げ、`min_size` 未満は返さない。
/// 空文字列は幅0なので `start_size` をそのまま返す。
pub fn fit_single_line<M>(text: &str, max_width: f32, start_size: f32, min_size: f32, measure: M) -> FitResult
where
    M: Fn(&str, f32) -> f32,
{
    if text.is_empty() {
        return FitResult::SingleLine {
            font_size: start_size.max(min_size),
        };
    }

    let mut font_size = start_size;
    while font_size > min_size && measure(text, font_size) > max_width {
        font_size -= FONT_STEP;
    }

    FitResult::SingleLine {
        font_size: font_size.max(min_size),
    }
}

/// 単語単位の貪欲折り返し
///
/// 必ず1行以上を返す（空文字列は空の1行）。
pub fn wrap_lines<M>(text: &str, max_width: f32, font_size: f32, measure: M) -> Vec<String>
where
    M: Fn(&str, f32) -> f32,
{
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if line.is_empty() {
            line.push_str(word);
            continue;
        }

        let candidate = format!("{} {}", line, word);
        if measure(&candidate, font_size) <= max_width {
            line = candidate;
        } else {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
        }
    }
    lines.push(line);

    lines
}

/// 折り返し込みでボックスに収まる最大サイズを探す
///
/// 各行が `max_width` に収まり、行ブロックの高さ（行数 × サイズ × 行間比）が
/// `max_height` に収まるまで2pxずつ縮小する。下限に達したらその時点の折り返しを返す。
pub fn fit_wrapped<M>(
    text: &str,
    max_width: f32,
    max_height: f32,
    start_size: f32,
    min_size: f32,
    line_height_ratio: f32,
    measure: M,
) -> FitResult
where
    M: Fn(&str, f32) -> f32,
{
    let mut font_size = start_size.max(min_size);

    loop {
        let lines = wrap_lines(text, max_width, font_size, &measure);
        let block_height = lines.len() as f32 * font_size * line_height_ratio;
        let fits = block_height <= max_height
            && lines.iter().all(|l| measure(l, font_size) <= max_width);

        if fits || font_size <= min_size {
            return FitResult::Wrapped { font_size, lines };
        }
        font_size = (font_size - FONT_STEP).max(min_size);
    }
}

/// モードに応じてフィット
#[allow(clippy::too_many_arguments)]
pub fn fit<M>(
    text: &str,
    max_width: f32,
    max_height: f32,
    start_size: f32,
    min_size: f32,
    mode: TextMode,
    line_height_ratio: f32,
    measure: M,
) -> FitResult
where
    M: Fn(&str, f32) -> f32,
{
    match mode {
        TextMode::SingleLine => fit_single_line(text, max_width, start_size, min_size, measure),
        TextMode::Wrap => fit_wrapped(
            text,
            max_width,
            max_height,
            start_size,
            min_size,
            line_height_ratio,
            measure,
        ),
    }
}

/// 行ブロックを縦中央に置いたときの、先頭行の中心Y
pub fn first_line_center_y(center_y: f32, line_count: usize, line_height: f32) -> f32 {
    let lines = line_count.max(1) as f32;
    center_y - (lines - 1.0) * line_height / 2.0
}
