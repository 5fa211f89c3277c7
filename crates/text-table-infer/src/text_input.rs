use encoding_rs::{EUC_KR, Encoding, UTF_8};

fn looks_decoding_broken(text: &str) -> bool {
    let total = text.chars().count();
    if total == 0 {
        return false;
    }

    let replacement = text.matches('\u{FFFD}').count();
    let control = text
        .chars()
        .filter(|ch| ch.is_control() && !matches!(ch, '\n' | '\r' | '\t'))
        .count();

    replacement * 8 > total || control * 5 > total
}

/// Decodes uploaded text of unknown encoding. A BOM wins; otherwise strict
/// UTF-8, then EUC-KR (common for Korean spreadsheets exported as CSV), then
/// lossy UTF-8.
#[must_use]
pub fn decode_text(bytes: &[u8]) -> String {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return text.into_owned();
    }

    if let Some(text) = UTF_8.decode_without_bom_handling_and_without_replacement(bytes) {
        return text.into_owned();
    }

    let (euc_kr, had_errors) = EUC_KR.decode_without_bom_handling(bytes);
    if !had_errors && !looks_decoding_broken(&euc_kr) {
        return euc_kr.into_owned();
    }

    String::from_utf8_lossy(bytes).into_owned()
}
