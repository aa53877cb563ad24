// Literal fixtures for the legal amount-in-words conversion.
//
// The conversion is deterministic and locale-sensitive; these strings are
// what lands on printed documents, so they are pinned verbatim.

use rust_decimal_macros::dec;

use facturier::core::Language;
use facturier::modules::documents::services::amount_in_words::legal_amount;

#[test]
fn test_round_amount_without_centimes() {
    assert_eq!(
        legal_amount(dec!(300.00), Language::Fr),
        "TROIS CENTS DIRHAMS TTC"
    );
}

#[test]
fn test_statutory_total_fixture() {
    assert_eq!(
        legal_amount(dec!(1080.00), Language::Fr),
        "MILLE QUATRE-VINGTS DIRHAMS TTC"
    );
}

#[test]
fn test_amount_with_centimes() {
    assert_eq!(
        legal_amount(dec!(1234.56), Language::Fr),
        "MILLE DEUX CENT TRENTE-QUATRE DIRHAMS ET 56 CTS TTC"
    );
}

#[test]
fn test_vigesimal_forms() {
    assert_eq!(
        legal_amount(dec!(71.00), Language::Fr),
        "SOIXANTE ET ONZE DIRHAMS TTC"
    );
    assert_eq!(
        legal_amount(dec!(81.00), Language::Fr),
        "QUATRE-VINGT-UN DIRHAMS TTC"
    );
    assert_eq!(
        legal_amount(dec!(91.00), Language::Fr),
        "QUATRE-VINGT-ONZE DIRHAMS TTC"
    );
}

#[test]
fn test_zero_dirhams() {
    assert_eq!(
        legal_amount(dec!(0.50), Language::Fr),
        "ZÉRO DIRHAMS ET 50 CTS TTC"
    );
}

#[test]
fn test_large_amounts() {
    assert_eq!(
        legal_amount(dec!(1000000.00), Language::Fr),
        "UN MILLION DIRHAMS TTC"
    );
    assert_eq!(
        legal_amount(dec!(200000.00), Language::Fr),
        "DEUX CENT MILLE DIRHAMS TTC"
    );
}

#[test]
fn test_english_rendering() {
    assert_eq!(
        legal_amount(dec!(1234.56), Language::En),
        "ONE THOUSAND TWO HUNDRED THIRTY-FOUR DIRHAMS AND 56 CTS TTC"
    );
}

#[test]
fn test_arabic_tenants_receive_the_french_legal_string() {
    assert_eq!(
        legal_amount(dec!(1234.56), Language::Ar),
        legal_amount(dec!(1234.56), Language::Fr)
    );
}
