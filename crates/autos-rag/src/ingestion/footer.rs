//! Boilerplate-footer removal
//!
//! The originating system stamps every page with a fixed footer: generating
//! user, document number, access URL and electronic-signature line. The
//! whole template is matched at once; documents without it pass through
//! unchanged.

use once_cell::sync::Lazy;
use regex::Regex;

// (?s) so the template may span lines; the alternatives inside each line
// stay anchored by the literal prefixes.
static FOOTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?s)Este documento foi gerado pelo usuário\s+[\d*.\-]+ em \d{2}/\d{2}/\d{4} \d{2}:\d{2}:\d{2}\nNúmero do documento:\s*\d+\nhttps?://[^\n]+\nAssinado eletronicamente por:[^\n]+ - \d{2}/\d{2}/\d{4} \d{2}:\d{2}:\d{2}",
    )
    .unwrap()
});

/// Remove every occurrence of the page footer and trim the result.
///
/// Absence of the footer is not an error; not all documents carry it.
pub fn strip_footer(text: &str) -> String {
    FOOTER.replace_all(text, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn footer(document_number: &str) -> String {
        format!(
            "Este documento foi gerado pelo usuário 111.222.333-44 em 05/06/2025 10:49:21\n\
Número do documento: {}\n\
https://pje1grau.tjma.jus.br/pje/Processo/ConsultaDocumento/listView.seam?x=abc123\n\
Assinado eletronicamente por: JOSE DA SILVA - 05/06/2025 10:49:21",
            document_number
        )
    }

    #[test]
    fn stripping_an_appended_footer_restores_the_original_text() {
        let body = "CONTESTAÇÃO\n\nO réu, por seu advogado, vem apresentar contestação.";
        let with_footer = format!("{}\n{}", body, footer("110935393"));

        assert_eq!(strip_footer(&with_footer), body);
    }

    #[test]
    fn text_without_footer_passes_through() {
        let body = "Despacho: cite-se o réu.";
        assert_eq!(strip_footer(body), body);
    }

    #[test]
    fn every_occurrence_is_removed() {
        let text = format!(
            "página um\n{}\npágina dois\n{}",
            footer("101"),
            footer("102")
        );
        let cleaned = strip_footer(&text);
        assert!(cleaned.contains("página um"));
        assert!(cleaned.contains("página dois"));
        assert!(!cleaned.contains("Assinado eletronicamente"));
    }

    #[test]
    fn masked_user_ids_match() {
        let text = "corpo\nEste documento foi gerado pelo usuário ***.222.333-** em 05/06/2025 10:49:21\n\
Número do documento: 99\nhttp://pje.tj.br/doc\nAssinado eletronicamente por: MARIA - 05/06/2025 10:49:21";
        assert_eq!(strip_footer(text), "corpo");
    }
}
