// Code tables and category/operator classification
//
// Operator codes are the provider's `codiceCliente`; category codes are the
// short service-tier codes (REG, IC, FR, ...).

use crate::bt_models::TrainProgress;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;

pub const HERITAGE_OPERATOR: &str = "FondazioneFS";
pub const HERITAGE_OPERATOR_LINK: &str = "https://www.fondazionefs.it";
pub const HERITAGE_CATEGORY: &str = "TS";
pub const OTHER_OPERATOR: &str = "Other";
pub const FALLBACK_CATEGORY_LABEL: &str = "Treno";

/// FS Treni Turistici Italiani always uses its own icon.
pub const TOURISM_CLIENT_CODE: i64 = 77;
pub const TOURISM_ICON: &str = "pic/TTI.png";

lazy_static! {
    pub static ref CLIENT_MAP: HashMap<i64, &'static str> = HashMap::from([
        (1, "Trenitalia"),
        (2, "Trenitalia"),
        (4, "Trenitalia"),
        (18, "Trenitalia TPER"),
        (910, "Ferrovie del Sud Est"),
        (63, "Trenord"),
        (64, "ÖBB"),
    ]);

    pub static ref CLIENT_LINK_MAP: HashMap<&'static str, &'static str> = HashMap::from([
        ("Trenitalia", "https://www.trenitalia.com"),
        ("Trenitalia TPER", "https://www.trenitaliatper.it"),
        ("Ferrovie del Sud Est", "https://www.trenitalia.com"),
        ("Trenord", "https://www.trenord.it"),
        ("ÖBB", "https://www.oebb.at"),
    ]);

    pub static ref CAT_MAP: HashMap<&'static str, &'static str> = HashMap::from([
        ("REG", "Regionale"),
        ("RV", "Regionale Veloce"),
        ("MET", "Metropolitan"),
        ("FR", "Frecciarossa"),
        ("IC", "Intercity"),
        ("ICN", "Intercity Notte"),
        ("EC", "Eurocity"),
        ("FB", "Frecciabianca"),
        ("FA", "Frecciargento"),
        ("EN", "EuroNight"),
        ("RE", "Regionale"),
        ("TS", "Treno Storico"),
        ("EXP", "Espresso"),
    ]);

    /// Icon per `"{operatorCode}-{categoryCode}"`.
    pub static ref CAT_IMAGE_MAP: HashMap<String, &'static str> = {
        let mut map = HashMap::new();

        // Trenitalia shares one set of icons across its three codes
        let trenitalia: [(&str, &str); 12] = [
            ("IC", "pic/IC.png"),
            ("ICN", "pic/ICN.png"),
            ("REG", "pic/RV.png"),
            ("RV", "pic/RV.png"),
            ("MET", "pic/RV.png"),
            ("RE", "pic/RV.png"),
            ("FR", "pic/FR.png"),
            ("FA", "pic/FA.png"),
            ("FB", "pic/FB.png"),
            ("EC", "pic/EC.png"),
            ("EN", "pic/EN.png"),
            ("TS", "pic/FS.png"),
        ];
        for client in [1, 2, 4] {
            for (cat, icon) in trenitalia {
                map.insert(format!("{}-{}", client, cat), icon);
            }
            map.insert(format!("{}-EXP", client), "pic/Espresso.png");
        }

        // Regional operators
        for client in [18, 910, 63] {
            for cat in ["REG", "RV", "RE"] {
                map.insert(format!("{}-{}", client, cat), "pic/regn.png");
            }
        }

        map.insert("64-EC".to_string(), "pic/RJ.png");
        map.insert("64-EN".to_string(), "pic/NJ.png");
        map
    };

    static ref LEADING_CATEGORY: Regex = Regex::new(r"[A-Z]+").unwrap();
    static ref BOARD_TRAIN_NUMBER: Regex = Regex::new(r"^([A-Z\s]+?)\s*(\d+)$").unwrap();
}

// ============================================================================
// Badge buckets
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    Regional,
    HighSpeed,
    Intercity,
    International,
    Heritage,
    Express,
}

impl Badge {
    pub fn for_category(code: &str) -> Option<Badge> {
        match code {
            "REG" | "RE" | "RV" | "MET" => Some(Badge::Regional),
            "FR" | "FB" | "FA" => Some(Badge::HighSpeed),
            "IC" | "ICN" => Some(Badge::Intercity),
            "EC" | "EN" => Some(Badge::International),
            "TS" => Some(Badge::Heritage),
            "EXP" => Some(Badge::Express),
            _ => None,
        }
    }
}

// ============================================================================
// Train classification
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    pub category_code: String,
    pub category_label: String,
    pub operator_name: String,
    pub operator_link: Option<String>,
    pub badge: Option<Badge>,
    pub icon_asset: Option<String>,
}

/// Resolve the category code of a run. Later rules override earlier ones:
/// provider code, then the first capital run of the composite number, then
/// the "EC FR" brand, then heritage "TS".
pub fn resolve_category(categoria: Option<&str>, comp_numero_treno: Option<&str>) -> String {
    let mut code = categoria.map(str::trim).unwrap_or_default().to_string();

    let composite = comp_numero_treno.unwrap_or_default();
    if code.is_empty() {
        if let Some(m) = LEADING_CATEGORY.find(composite) {
            code = m.as_str().to_string();
        }
    }

    let upper = composite.to_uppercase();
    if upper.contains("EC FR") {
        code = "FR".to_string();
    }
    if upper.contains(HERITAGE_CATEGORY) {
        code = HERITAGE_CATEGORY.to_string();
    }

    code
}

pub fn classify_train(raw: &TrainProgress) -> Classification {
    let category_code = resolve_category(raw.categoria.as_deref(), raw.comp_numero_treno.as_deref());

    let (operator_name, operator_link) = if category_code == HERITAGE_CATEGORY {
        (HERITAGE_OPERATOR.to_string(), Some(HERITAGE_OPERATOR_LINK.to_string()))
    } else {
        let name = raw
            .codice_cliente
            .and_then(|code| CLIENT_MAP.get(&code).copied())
            .unwrap_or(OTHER_OPERATOR);
        (name.to_string(), CLIENT_LINK_MAP.get(name).map(|l| l.to_string()))
    };

    let icon_asset = match raw.codice_cliente {
        Some(TOURISM_CLIENT_CODE) => Some(TOURISM_ICON.to_string()),
        Some(client) => CAT_IMAGE_MAP
            .get(&format!("{}-{}", client, category_code))
            .map(|icon| icon.to_string()),
        None => None,
    };

    let category_label = CAT_MAP
        .get(category_code.as_str())
        .map(|label| label.to_string())
        .or_else(|| {
            raw.categoria_descrizione
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(String::from)
        })
        .or_else(|| Some(category_code.clone()).filter(|c| !c.is_empty()))
        .unwrap_or_else(|| FALLBACK_CATEGORY_LABEL.to_string());

    Classification {
        badge: Badge::for_category(&category_code),
        category_code,
        category_label,
        operator_name,
        operator_link,
        icon_asset,
    }
}

// ============================================================================
// Board train numbers ("REG 24435" -> REG / 24435)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrainNumberBadge {
    /// `None` when the composite number could not be split.
    pub category: Option<String>,
    pub number: String,
    pub badge: Option<Badge>,
}

pub fn split_train_number(composite: &str) -> TrainNumberBadge {
    let composite = composite.trim();

    let Some(caps) = BOARD_TRAIN_NUMBER.captures(composite) else {
        return TrainNumberBadge {
            category: None,
            number: composite.to_string(),
            badge: None,
        };
    };

    let mut category = caps[1].trim().to_string();
    let upper = category.to_uppercase();
    if upper.contains("EC FR") {
        category = "FR".to_string();
    }
    if upper.contains(HERITAGE_CATEGORY) {
        category = HERITAGE_CATEGORY.to_string();
    }

    TrainNumberBadge {
        badge: Badge::for_category(&category),
        category: Some(category),
        number: caps[2].to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(categoria: Option<&str>, comp: Option<&str>, client: Option<i64>) -> TrainProgress {
        TrainProgress {
            categoria: categoria.map(String::from),
            comp_numero_treno: comp.map(String::from),
            codice_cliente: client,
            ..Default::default()
        }
    }

    #[test]
    fn provider_category_is_used_verbatim() {
        let c = classify_train(&raw(Some(" IC "), Some("IC 630"), Some(2)));
        assert_eq!(c.category_code, "IC");
        assert_eq!(c.category_label, "Intercity");
        assert_eq!(c.operator_name, "Trenitalia");
        assert_eq!(c.operator_link.as_deref(), Some("https://www.trenitalia.com"));
        assert_eq!(c.badge, Some(Badge::Intercity));
        assert_eq!(c.icon_asset.as_deref(), Some("pic/IC.png"));
    }

    #[test]
    fn category_falls_back_to_composite_number() {
        let c = classify_train(&raw(Some(""), Some("REG 24435"), Some(63)));
        assert_eq!(c.category_code, "REG");
        assert_eq!(c.operator_name, "Trenord");
        assert_eq!(c.icon_asset.as_deref(), Some("pic/regn.png"));
    }

    #[test]
    fn ec_fr_is_sold_as_frecciarossa() {
        let c = classify_train(&raw(Some("EC"), Some("EC FR 9523"), Some(1)));
        assert_eq!(c.category_code, "FR");
        assert_eq!(c.badge, Some(Badge::HighSpeed));
        assert_eq!(c.icon_asset.as_deref(), Some("pic/FR.png"));
    }

    #[test]
    fn heritage_wins_over_everything() {
        let c = classify_train(&raw(Some("REG"), Some("REG TS 64010"), Some(2)));
        assert_eq!(c.category_code, "TS");
        assert_eq!(c.operator_name, HERITAGE_OPERATOR);
        assert_eq!(c.operator_link.as_deref(), Some(HERITAGE_OPERATOR_LINK));
        assert_eq!(c.badge, Some(Badge::Heritage));

        let c = classify_train(&raw(None, Some("ec fr ts 1"), Some(1)));
        assert_eq!(c.category_code, "TS");
    }

    #[test]
    fn unknown_operator_and_category() {
        let mut r = raw(Some("XYZ"), Some("XYZ 1"), Some(999));
        r.categoria_descrizione = Some("Servizio speciale".to_string());
        let c = classify_train(&r);
        assert_eq!(c.operator_name, "Other");
        assert_eq!(c.operator_link, None);
        assert_eq!(c.badge, None);
        assert_eq!(c.icon_asset, None);
        assert_eq!(c.category_label, "Servizio speciale");

        let c = classify_train(&raw(None, Some("1234"), None));
        assert_eq!(c.category_code, "");
        assert_eq!(c.category_label, FALLBACK_CATEGORY_LABEL);
    }

    #[test]
    fn tourism_operator_has_fixed_icon() {
        let c = classify_train(&raw(Some("REG"), Some("REG 1"), Some(TOURISM_CLIENT_CODE)));
        assert_eq!(c.icon_asset.as_deref(), Some(TOURISM_ICON));
        assert_eq!(c.operator_name, "Other");
    }

    #[test]
    fn badge_buckets_do_not_overlap() {
        let codes = ["REG", "RE", "RV", "MET", "FR", "FB", "FA", "IC", "ICN", "EC", "EN", "TS", "EXP"];
        for code in codes {
            assert!(Badge::for_category(code).is_some(), "{}", code);
        }
        assert_eq!(Badge::for_category("RJ"), None);
    }

    #[test]
    fn board_train_number_split() {
        let b = split_train_number("REG 24435");
        assert_eq!(b.category.as_deref(), Some("REG"));
        assert_eq!(b.number, "24435");
        assert_eq!(b.badge, Some(Badge::Regional));

        let b = split_train_number("EC FR 9523");
        assert_eq!(b.category.as_deref(), Some("FR"));

        let b = split_train_number("  9999 ");
        assert_eq!(b.category, None);
        assert_eq!(b.number, "9999");
    }
}
