// ==========================================
// 发票催收汇总系统 - 文本规范化器
// ==========================================
// 职责: 修复乱码（mojibake）+ NFKC + 人工替换表 + 空白规范化
// 红线: normalize 必须幂等 normalize(normalize(s)) == normalize(s)
// ==========================================
// 单次 pass 的四个步骤:
// 1. 编码修复: 单字节编码 → UTF-8 正向尝试, 失败再尝试反向
// 2. NFKC 兼容组合
// 3. 人工替换表（按声明顺序逐条 replace-all）
// 4. 空白规范化（NBSP → 空格, 连续空白折叠, 去首尾）
// normalize 重复 pass 直至文本稳定（有上限）
// ==========================================

use encoding_rs::WINDOWS_1252;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

/// 默认最大 pass 次数
pub const DEFAULT_MAX_PASSES: usize = 16;

/// 单次 pass 内正向修复的最大剥离层数（多重乱码逐层还原）
const MAX_REPAIR_LAYERS: usize = 4;

// ==========================================
// 人工替换表（顺序敏感, 不可改为无序映射）
// ==========================================
// 已知数据问题（保留原样, 不做猜测）:
// - "Ã‘"(U+2018) 与 "Ã\u{91}" 均映射到 Ñ
// - "ÃÍ" 与 "Ã\u{8D}" 均映射到 Í
// - "Ã3" → ó、"Ão" → u 来源可疑
// 同一输入命中多个条目时, 以声明顺序依次替换, 后者作用于前者的结果
pub const MANUAL_CORRECTIONS: &[(&str, &str)] = &[
    ("\u{C3}\u{B1}", "\u{F1}"),            // Ã± → ñ
    ("\u{C3}\u{2018}", "\u{D1}"),          // Ã‘ → Ñ
    ("\u{C3}\u{A1}", "\u{E1}"),            // Ã¡ → á
    ("\u{C3}\u{C1}", "\u{C1}"),            // ÃÁ → Á
    ("\u{C3}\u{A9}", "\u{E9}"),            // Ã© → é
    ("\u{C3}\u{2030}", "\u{C9}"),          // Ã‰ → É
    ("\u{C3}\u{AD}", "\u{ED}"),            // Ã + 软连字符 → í
    ("\u{C3}\u{CD}", "\u{CD}"),            // ÃÍ → Í
    ("\u{C3}\u{B3}", "\u{F3}"),            // Ã³ → ó
    ("\u{C3}\u{201C}", "\u{D3}"),          // Ã“ → Ó
    ("\u{C3}\u{BA}", "\u{FA}"),            // Ãº → ú
    ("\u{C3}\u{161}", "\u{DA}"),           // Ãš → Ú
    ("\u{C3}\u{BC}", "\u{FC}"),            // Ã¼ → ü
    ("\u{C3}\u{153}", "\u{DC}"),           // Ãœ → Ü
    ("\u{C3} ", "\u{E0}"),                 // "Ã " → à
    ("\u{C3}\u{A8}", "\u{E8}"),            // Ã¨ → è
    ("\u{C3}\u{91}", "\u{D1}"),            // Ã + C1 控制符 0x91 → Ñ
    ("\u{C3}3", "\u{F3}"),                 // Ã3 → ó
    ("\u{C3}o", "u"),                      // Ão → u
    ("\u{C2}\u{BF}", "\u{BF}"),            // Â¿ → ¿
    ("\u{C2}\u{A1}", "\u{A1}"),            // Â¡ → ¡
    ("\u{C2}\u{B4}", "\u{B4}"),            // Â´ → ´
    ("\u{E2}\u{20AC}\u{201C}", "-"),       // â€“ → -
    ("\u{C3}\u{8D}", "\u{CD}"),            // Ã + C1 控制符 0x8D → Í
    ("\u{E2}\u{20AC}\u{153}", "\""),       // â€œ → "
    ("\u{E2}\u{20AC}\u{9D}", "\""),        // â€ + 0x9D → "
    ("\u{E2}\u{20AC}\u{2DC}", "'"),        // â€˜ → '
    ("\u{E2}\u{20AC}\u{2122}", "'"),       // â€™ → '
    ("\u{E2}\u{20AC}\u{A6}", "..."),       // â€¦ → ...
];

// ==========================================
// RepairOutcome - 编码修复结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepairOutcome {
    /// 检测到乱码并已修复
    Repaired(String),
    /// 未检测到乱码, 原文不变
    Clean(String),
    /// 疑似乱码但无法修复, 原文不变（EncodingRepairFailed）
    Unrepairable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepairStatus {
    Repaired,
    Clean,
    Unrepairable,
}

impl RepairOutcome {
    pub fn status(&self) -> RepairStatus {
        match self {
            RepairOutcome::Repaired(_) => RepairStatus::Repaired,
            RepairOutcome::Clean(_) => RepairStatus::Clean,
            RepairOutcome::Unrepairable(_) => RepairStatus::Unrepairable,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            RepairOutcome::Repaired(s) | RepairOutcome::Clean(s) | RepairOutcome::Unrepairable(s) => s,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            RepairOutcome::Repaired(s) | RepairOutcome::Clean(s) | RepairOutcome::Unrepairable(s) => s,
        }
    }
}

/// 规范化结果: 最终文本 + 编码修复状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub text: String,
    pub status: RepairStatus,
}

// ==========================================
// TextNormalizer
// ==========================================
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    max_passes: usize,
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PASSES)
    }
}

impl TextNormalizer {
    pub fn new(max_passes: usize) -> Self {
        Self {
            max_passes: max_passes.max(1),
        }
    }

    /// 规范化文本（幂等）
    pub fn normalize(&self, text: &str) -> String {
        self.normalize_detailed(text).text
    }

    /// 规范化文本并返回编码修复状态
    ///
    /// 状态汇总规则:
    /// - 任一 pass 发生修复 → Repaired
    /// - 否则首个 pass 为 Unrepairable → Unrepairable
    /// - 否则 → Clean
    pub fn normalize_detailed(&self, text: &str) -> Normalized {
        let (mut current, first_status) = single_pass(text);
        let mut repaired = first_status == RepairStatus::Repaired;

        for pass in 1..self.max_passes {
            let (next, status) = single_pass(&current);
            if next == current {
                break;
            }
            repaired |= status == RepairStatus::Repaired;
            current = next;
            if pass + 1 == self.max_passes {
                debug!(passes = self.max_passes, "文本规范化达到最大 pass 次数");
            }
        }

        let status = if repaired {
            RepairStatus::Repaired
        } else {
            first_status
        };
        Normalized {
            text: current,
            status,
        }
    }
}

/// 单次 pass: 修复 → NFKC → 替换表 → 空白
fn single_pass(text: &str) -> (String, RepairStatus) {
    let outcome = repair_encoding(text);
    let status = outcome.status();
    let composed: String = outcome.text().nfkc().collect();
    let corrected = apply_manual_corrections(&composed);
    (normalize_whitespace(&corrected), status)
}

// ==========================================
// 步骤 1: 编码修复
// ==========================================

/// 编码修复
///
/// 1. 正向: 按单字节编码映射为字节, 再按 UTF-8 解码; 成功即采用（逐层剥离）。
///    正确文本若恰好两种解释都合法, 同样会被“修复”。
/// 2. 正向失败时不做反向重解释: UTF-8 → Windows-1252 会把每个非 ASCII 字符
///    展开为“首字节 + 续字节”序列, 只会加重乱码, 视为失败。
/// 3. 失败: 可疑度 > 0 为 Unrepairable（原文不变）, 否则为 Clean。
pub fn repair_encoding(text: &str) -> RepairOutcome {
    let mut repaired: Option<String> = None;
    for _ in 0..MAX_REPAIR_LAYERS {
        let source = repaired.as_deref().unwrap_or(text);
        match forward_candidate(source) {
            Some(next) if next != source => repaired = Some(next),
            _ => break,
        }
    }
    if let Some(repaired) = repaired {
        return RepairOutcome::Repaired(repaired);
    }

    if suspicion_score(text) == 0 {
        RepairOutcome::Clean(text.to_string())
    } else {
        RepairOutcome::Unrepairable(text.to_string())
    }
}

/// 正向候选: 单字节编码 → UTF-8
pub fn forward_candidate(text: &str) -> Option<String> {
    let bytes = encode_single_byte(text)?;
    String::from_utf8(bytes).ok()
}

/// 单字节映射: U+0000..=U+00FF 取码位本身（ISO-8859-1）,
/// 其余字符取 Windows-1252 的单字节编码; 无法映射则失败
fn encode_single_byte(text: &str) -> Option<Vec<u8>> {
    let mut bytes = Vec::with_capacity(text.len());
    for ch in text.chars() {
        bytes.push(single_byte_of(ch)?);
    }
    Some(bytes)
}

fn single_byte_of(ch: char) -> Option<u8> {
    let code = ch as u32;
    if code <= 0xFF {
        return Some(code as u8);
    }
    let mut buf = [0u8; 4];
    let (encoded, _, had_errors) = WINDOWS_1252.encode(ch.encode_utf8(&mut buf));
    if had_errors || encoded.len() != 1 {
        return None;
    }
    Some(encoded[0])
}

/// 可疑度: “像 UTF-8 首字节的字符”紧跟“像续字节的字符”的次数
pub fn suspicion_score(text: &str) -> usize {
    let chars: Vec<char> = text.chars().collect();
    chars
        .windows(2)
        .filter(|pair| is_lead_like(pair[0]) && is_continuation_like(pair[1]))
        .count()
}

fn is_lead_like(ch: char) -> bool {
    ('\u{C2}'..='\u{F4}').contains(&ch)
}

fn is_continuation_like(ch: char) -> bool {
    matches!(single_byte_of(ch), Some(0x80..=0xBF))
}

// ==========================================
// 步骤 3: 人工替换表
// ==========================================
pub fn apply_manual_corrections(text: &str) -> String {
    let mut result = text.to_string();
    for &(corrupted, correct) in MANUAL_CORRECTIONS {
        if result.contains(corrupted) {
            result = result.replace(corrupted, correct);
        }
    }
    result
}

// ==========================================
// 步骤 4: 空白规范化
// ==========================================
pub fn normalize_whitespace(text: &str) -> String {
    text.replace('\u{A0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    #[test]
    fn test_repairs_utf8_read_as_latin1() {
        let normalizer = TextNormalizer::default();
        let result = normalizer.normalize_detailed("Espa\u{C3}\u{B1}a");
        assert_eq!(result.text, "España");
        assert_eq!(result.status, RepairStatus::Repaired);
    }

    #[test]
    fn test_corrupted_enye_is_idempotent() {
        let normalizer = TextNormalizer::default();
        let once = normalizer.normalize("PEQUE\u{C3}\u{2018}A EMPRESA");
        assert_eq!(once, "PEQUEÑA EMPRESA");
        assert_eq!(normalizer.normalize(&once), once);
    }

    #[test]
    fn test_double_mojibake_unwinds() {
        // "ñ" 经两次 UTF-8 → Windows-1252 误解码
        let twice = "Espa\u{C3}\u{192}\u{C2}\u{B1}a";
        assert_eq!(TextNormalizer::default().normalize(twice), "España");
    }

    #[test]
    fn test_correct_text_is_clean() {
        let result = TextNormalizer::default().normalize_detailed("Muñoz Ibáñez");
        assert_eq!(result.text, "Muñoz Ibáñez");
        assert_eq!(result.status, RepairStatus::Clean);
    }

    #[test]
    fn test_ascii_is_clean() {
        assert_eq!(
            repair_encoding("ACME SL"),
            RepairOutcome::Clean("ACME SL".to_string())
        );
    }

    #[test]
    fn test_unrepairable_falls_back_to_original() {
        // 0x80 (€) 孤立续字节导致正向失败
        let outcome = repair_encoding("\u{C3}\u{B1}\u{20AC}");
        assert_eq!(
            outcome,
            RepairOutcome::Unrepairable("\u{C3}\u{B1}\u{20AC}".to_string())
        );
        // 替换表仍然修复残留
        assert_eq!(TextNormalizer::default().normalize("\u{C3}\u{B1}\u{20AC}"), "ñ€");
    }

    #[test]
    fn test_failed_forward_leaves_text_unchanged() {
        // 正确的 “€” 不会被重解释为 â‚¬
        assert_eq!(repair_encoding("€"), RepairOutcome::Clean("€".to_string()));
        assert_eq!(TextNormalizer::default().normalize("€"), "€");

        // 含 U+0100 以上非 Windows-1252 字符, 正向失败, 可疑但保持原样
        let mixed = "\u{C3}\u{B1}\u{3A9}";
        assert_eq!(repair_encoding(mixed), RepairOutcome::Unrepairable(mixed.to_string()));
    }

    #[test]
    fn test_nfkc_and_whitespace() {
        let normalizer = TextNormalizer::default();
        assert_eq!(normalizer.normalize("\u{FB01}scal"), "fiscal");
        assert_eq!(
            normalizer.normalize("  Calle\u{A0}Mayor \t\n  12 "),
            "Calle Mayor 12"
        );
        assert_eq!(normalizer.normalize("   "), "");
    }

    #[test]
    fn test_manual_corrections_duplicate_targets() {
        assert_eq!(apply_manual_corrections("\u{C3}\u{2018}"), "Ñ");
        assert_eq!(apply_manual_corrections("\u{C3}\u{91}"), "Ñ");
        assert_eq!(apply_manual_corrections("\u{C3}\u{CD}"), "Í");
        assert_eq!(apply_manual_corrections("\u{C3}\u{8D}"), "Í");
        assert_eq!(apply_manual_corrections("\u{C3}o"), "u");
        assert_eq!(apply_manual_corrections("\u{E2}\u{20AC}\u{A6}"), "...");
    }

    #[test]
    fn test_manual_corrections_declared_order() {
        assert_eq!(MANUAL_CORRECTIONS.len(), 29);
        assert_eq!(MANUAL_CORRECTIONS[0], ("\u{C3}\u{B1}", "ñ"));
        assert_eq!(MANUAL_CORRECTIONS[28], ("\u{E2}\u{20AC}\u{A6}", "..."));

        let keys: HashSet<&str> = MANUAL_CORRECTIONS.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys.len(), MANUAL_CORRECTIONS.len());
    }

    #[test]
    fn test_smart_quotes_repair() {
        let normalizer = TextNormalizer::default();
        // “Deuda” 的 UTF-8 字节按 Windows-1252 误解码
        let corrupted = "\u{E2}\u{20AC}\u{153}Deuda\u{E2}\u{20AC}\u{9D}";
        assert_eq!(normalizer.normalize(corrupted), "\u{201C}Deuda\u{201D}");
    }

    #[test]
    fn test_suspicion_score() {
        assert_eq!(suspicion_score("año"), 0);
        assert_eq!(suspicion_score("a\u{C3}\u{B1}o"), 1);
        assert_eq!(suspicion_score(""), 0);
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(s in any::<String>()) {
            let normalizer = TextNormalizer::default();
            let once = normalizer.normalize(&s);
            prop_assert_eq!(normalizer.normalize(&once), once);
        }

        #[test]
        fn prop_normalize_is_idempotent_on_mojibake_alphabet(
            s in "[aoAÑ3 \u{A0}\u{C3}\u{C2}\u{E2}\u{20AC}\u{B1}\u{2018}\u{A1}\u{A9}\u{B4}\u{91}]{0,24}"
        ) {
            let normalizer = TextNormalizer::default();
            let once = normalizer.normalize(&s);
            prop_assert_eq!(normalizer.normalize(&once), once);
        }

        #[test]
        fn prop_output_has_no_outer_or_double_whitespace(s in any::<String>()) {
            let out = TextNormalizer::default().normalize(&s);
            prop_assert_eq!(out.trim(), out.as_str());
            prop_assert!(!out.contains("  "));
            prop_assert!(!out.contains('\u{A0}'), "nbsp left in output");
        }

        #[test]
        fn prop_repair_changes_text_only_through_forward(s in any::<String>()) {
            let outcome = repair_encoding(&s);
            let forward_changes = forward_candidate(&s).map_or(false, |c| c != s);
            prop_assert_eq!(outcome.status() == RepairStatus::Repaired, forward_changes);
            if !forward_changes {
                prop_assert_eq!(outcome.text(), s.as_str());
            }
        }
    }
}
