// Legal amount-in-words string for official documents.
//
// The grand total is split into whole dirhams and centimes; the dirham part
// is spelled out in the tenant's document language and the fixed
// "Dirhams [Et NN Cts] TTC" suffix is appended, all upper-cased. Arabic
// tenants receive the French legal string, matching Moroccan official
// documents.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::core::Language;

/// Spell `total_ttc` for the printed document.
///
/// Deterministic and locale-sensitive; verified against literal fixtures.
pub fn legal_amount(total_ttc: Decimal, language: Language) -> String {
    let dirhams = total_ttc.trunc().to_u64().unwrap_or(0);
    let centimes = ((total_ttc - total_ttc.trunc()) * Decimal::ONE_HUNDRED)
        .round()
        .to_u32()
        .unwrap_or(0);

    let text = match language {
        Language::Fr | Language::Ar => {
            let words = spell_fr(dirhams);
            if centimes > 0 {
                format!("{} Dirhams Et {} Cts TTC", words, centimes)
            } else {
                format!("{} Dirhams TTC", words)
            }
        }
        Language::En => {
            let words = spell_en(dirhams);
            if centimes > 0 {
                format!("{} Dirhams And {} Cts TTC", words, centimes)
            } else {
                format!("{} Dirhams TTC", words)
            }
        }
    };

    text.to_uppercase()
}

const FR_UNITS: [&str; 17] = [
    "zéro", "un", "deux", "trois", "quatre", "cinq", "six", "sept", "huit", "neuf", "dix",
    "onze", "douze", "treize", "quatorze", "quinze", "seize",
];

/// Spell 0..=99. Handles the vigesimal 70-99 range and the "et un" joins.
fn fr_below_100(n: u64) -> String {
    debug_assert!(n < 100);
    match n {
        0..=16 => FR_UNITS[n as usize].to_string(),
        17..=19 => format!("dix-{}", FR_UNITS[(n - 10) as usize]),
        20..=69 => {
            let tens_word = match n / 10 {
                2 => "vingt",
                3 => "trente",
                4 => "quarante",
                5 => "cinquante",
                _ => "soixante",
            };
            match n % 10 {
                0 => tens_word.to_string(),
                1 => format!("{} et un", tens_word),
                u => format!("{}-{}", tens_word, FR_UNITS[u as usize]),
            }
        }
        70 => "soixante-dix".to_string(),
        71 => "soixante et onze".to_string(),
        72..=79 => format!("soixante-{}", fr_below_100(n - 60)),
        80 => "quatre-vingts".to_string(),
        81..=89 => format!("quatre-vingt-{}", FR_UNITS[(n - 80) as usize]),
        90..=99 => format!("quatre-vingt-{}", fr_below_100(n - 80)),
        _ => unreachable!(),
    }
}

/// Spell 0..=999. `terminal` is false when another numeral follows ("mille"),
/// which strips the plural s from "quatre-vingts" and "cents".
fn fr_below_1000(n: u64, terminal: bool) -> String {
    debug_assert!(n < 1000);
    let hundreds = n / 100;
    let rest = n % 100;

    let mut out = match hundreds {
        0 => String::new(),
        1 => "cent".to_string(),
        h if rest == 0 && terminal => format!("{} cents", FR_UNITS[h as usize]),
        h => format!("{} cent", FR_UNITS[h as usize]),
    };

    if rest > 0 || hundreds == 0 {
        let tail = fr_below_100(rest);
        let tail = if !terminal && rest == 80 {
            "quatre-vingt".to_string()
        } else {
            tail
        };
        if out.is_empty() {
            out = tail;
        } else {
            out.push(' ');
            out.push_str(&tail);
        }
    }

    out
}

/// French integer speller, num2words orthography.
fn spell_fr(n: u64) -> String {
    if n == 0 {
        return "zéro".to_string();
    }

    let mut parts: Vec<String> = Vec::new();

    let billions = n / 1_000_000_000;
    let millions = (n / 1_000_000) % 1_000;
    let thousands = (n / 1_000) % 1_000;
    let rest = n % 1_000;

    if billions > 0 {
        if billions == 1 {
            parts.push("un milliard".to_string());
        } else {
            parts.push(format!("{} milliards", fr_below_1000(billions, true)));
        }
    }
    if millions > 0 {
        if millions == 1 {
            parts.push("un million".to_string());
        } else {
            parts.push(format!("{} millions", fr_below_1000(millions, true)));
        }
    }
    if thousands > 0 {
        if thousands == 1 {
            // "mille", never "un mille"
            parts.push("mille".to_string());
        } else {
            parts.push(format!("{} mille", fr_below_1000(thousands, false)));
        }
    }
    if rest > 0 {
        parts.push(fr_below_1000(rest, true));
    }

    parts.join(" ")
}

const EN_BELOW_20: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];

const EN_TENS: [&str; 8] = [
    "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

fn en_below_1000(n: u64) -> String {
    debug_assert!(n < 1000);
    let mut out = String::new();

    let hundreds = n / 100;
    let rest = n % 100;

    if hundreds > 0 {
        out.push_str(EN_BELOW_20[hundreds as usize]);
        out.push_str(" hundred");
    }
    if rest > 0 {
        if !out.is_empty() {
            out.push(' ');
        }
        if rest < 20 {
            out.push_str(EN_BELOW_20[rest as usize]);
        } else {
            out.push_str(EN_TENS[(rest / 10 - 2) as usize]);
            if rest % 10 > 0 {
                out.push('-');
                out.push_str(EN_BELOW_20[(rest % 10) as usize]);
            }
        }
    }

    out
}

/// English integer speller, short scale.
fn spell_en(n: u64) -> String {
    if n == 0 {
        return "zero".to_string();
    }

    let groups = [
        (n / 1_000_000_000, "billion"),
        ((n / 1_000_000) % 1_000, "million"),
        ((n / 1_000) % 1_000, "thousand"),
    ];

    let mut parts: Vec<String> = Vec::new();
    for (count, scale) in groups {
        if count > 0 {
            parts.push(format!("{} {}", en_below_1000(count), scale));
        }
    }
    if n % 1_000 > 0 {
        parts.push(en_below_1000(n % 1_000));
    }

    parts.join(" ")
}
