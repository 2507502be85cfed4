use crate::patterns::PatternTable;
use crate::types::ShipId;

/// Extract the ship a line talks about.
///
/// Patterns are tried from most to least specific and the first hit wins:
/// `[GT-AI] ABC-123`, `(ABC-123)`, `Ship=ABC-123`, then a bare `ABC-123`
/// anywhere in the line. The bare form is last so sector codes and other
/// short codes in free text lose against the tagged forms.
pub fn extract_ship_id(table: &PatternTable, line: &str) -> Option<ShipId> {
    [
        &table.ship_gt_ai,
        &table.ship_paren,
        &table.ship_attr,
        &table.ship_bare,
    ]
    .into_iter()
    .find_map(|re| re.captures(line))
    .and_then(|caps| caps.get(1))
    .and_then(|m| ShipId::parse(m.as_str()).ok())
}

/// Extract the home sector name.
///
/// Older builds log `Operating with home base: <name> (maxbuy=...)`, newer
/// ones `homeSector=<name>` followed by another `key=`, a comma or the end
/// of the line. The older form is tried first.
pub fn extract_home_sector(table: &PatternTable, line: &str) -> Option<String> {
    let caps = table
        .home_base
        .captures(line)
        .or_else(|| table.home_sector_kv.captures(line))?;
    let home = caps.name("home")?.as_str().trim();
    if home.is_empty() {
        None
    } else {
        Some(home.to_string())
    }
}

/// Monetary fields (`money=`, `cost=`) carried by funds lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoneyFields {
    pub money: Option<i64>,
    pub cost: Option<i64>,
}

impl MoneyFields {
    pub fn is_empty(&self) -> bool {
        self.money.is_none() && self.cost.is_none()
    }
}

pub fn extract_money(table: &PatternTable, line: &str) -> MoneyFields {
    MoneyFields {
        money: capture_amount(&table.money, line),
        cost: capture_amount(&table.cost, line),
    }
}

/// Parse an amount, tolerating `,`/`_` group separators. Amounts that do not
/// fit are dropped rather than failing the line.
fn capture_amount(re: &regex::Regex, line: &str) -> Option<i64> {
    let raw = re.captures(line)?.get(1)?.as_str();
    let digits: String = raw.chars().filter(|c| *c != ',' && *c != '_').collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ship(line: &str) -> Option<String> {
        extract_ship_id(PatternTable::shared(), line).map(|s| s.to_string())
    }

    #[test]
    fn gt_ai_tag_wins_over_everything() {
        assert_eq!(
            ship("[GT-AI] ABC-123 targeting (DEF-456) Ship=GHI-789"),
            Some("ABC-123".into())
        );
    }

    #[test]
    fn paren_beats_attr_and_bare() {
        assert_eq!(
            ship("XYZ-000 selected for (DEF-456) Ship=GHI-789"),
            Some("DEF-456".into())
        );
    }

    #[test]
    fn attr_beats_bare() {
        assert_eq!(
            ship("sector XYZ-000 Ship=GHI-789"),
            Some("GHI-789".into())
        );
    }

    #[test]
    fn bare_fallback() {
        assert_eq!(ship("lost contact with QRS-321 now"), Some("QRS-321".into()));
    }

    #[test]
    fn no_ship() {
        assert_eq!(ship("[GT-Cache] refreshed 12 entries"), None);
        // Embedded in a longer token: no word boundary.
        assert_eq!(ship("codeXABC-1234"), None);
    }

    #[test]
    fn home_sector_format_one() {
        let t = PatternTable::shared();
        assert_eq!(
            extract_home_sector(t, "[GT-AI] ABC-123 Operating with home base: Argon Prime (maxbuy=3)"),
            Some("Argon Prime".into())
        );
    }

    #[test]
    fn home_sector_format_two() {
        let t = PatternTable::shared();
        assert_eq!(
            extract_home_sector(t, "[GT-AI] ABC-123 homeSector=Hatikvah's Choice I range=2"),
            Some("Hatikvah's Choice I".into())
        );
        assert_eq!(
            extract_home_sector(t, "[GT-AI] homeSector=Black Hole Sun IV, jumps=3"),
            Some("Black Hole Sun IV".into())
        );
        assert_eq!(
            extract_home_sector(t, "[GT-AI] homeSector=Grand Exchange"),
            Some("Grand Exchange".into())
        );
    }

    #[test]
    fn home_sector_prefers_format_one() {
        let t = PatternTable::shared();
        assert_eq!(
            extract_home_sector(
                t,
                "Operating with home base: Argon Prime (maxbuy=3) homeSector=Other"
            ),
            Some("Argon Prime".into())
        );
    }

    #[test]
    fn money_fields() {
        let t = PatternTable::shared();
        let m = extract_money(t, "[GT-Funds] BLOCKED (MD) money=1,250,000 cost=2_000");
        assert_eq!(m.money, Some(1_250_000));
        assert_eq!(m.cost, Some(2_000));

        let m = extract_money(t, "[GT-Funds] waiting for funds money=-50");
        assert_eq!(m.money, Some(-50));
        assert_eq!(m.cost, None);

        assert!(extract_money(t, "[GT-Funds] cap cleared").is_empty());
    }
}
