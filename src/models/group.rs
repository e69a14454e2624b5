// Allow dead code: API response structs have fields for completeness
#![allow(dead_code)]

use serde::{Deserialize, Serialize};

/// An expense-sharing group as returned by `GET /api/groups`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: i64,
    pub name: String,
}

/// Per-member balance line inside a group summary.
///
/// All amounts are computed server-side; the client only displays them.
/// A negative `balance` means the member owes the group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberBalance {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub paid: f64,
    #[serde(default)]
    pub owes: f64,
    #[serde(default)]
    pub balance: f64,
}

impl MemberBalance {
    pub fn owes_group(&self) -> bool {
        self.balance < 0.0
    }
}

/// A backend-suggested settlement payment: `from` pays `to` `amount`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementTransaction {
    pub from: String,
    pub to: String,
    pub amount: f64,
}

/// The full balance sheet for a group, `GET /api/groups/{id}/summary`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSummary {
    /// Group display name
    pub group: String,
    #[serde(rename = "totalExpense", default)]
    pub total_expense: f64,
    #[serde(rename = "splitPerHead", default)]
    pub split_per_head: f64,
    #[serde(default)]
    pub members: Vec<MemberBalance>,
    #[serde(default)]
    pub transactions: Vec<SettlementTransaction>,
}

impl GroupSummary {
    /// Balance line for a specific member, if they are in the group.
    pub fn member(&self, user_id: i64) -> Option<&MemberBalance> {
        self.members.iter().find(|m| m.id == user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_group_summary_response() {
        let json = r#"{
            "group": "Goa Trip",
            "totalExpense": 4500,
            "splitPerHead": 1500,
            "members": [
                {"id": 1, "name": "Asha", "paid": 3000, "owes": 1500, "balance": 1500},
                {"id": 2, "name": "Ravi", "paid": 1500, "owes": 1500, "balance": 0},
                {"id": 3, "name": "Meera", "paid": 0, "owes": 1500, "balance": -1500}
            ],
            "transactions": [
                {"from": "Meera", "to": "Asha", "amount": 1500}
            ]
        }"#;

        let summary: GroupSummary = serde_json::from_str(json)
            .expect("Failed to parse group summary test JSON");
        assert_eq!(summary.group, "Goa Trip");
        assert_eq!(summary.total_expense, 4500.0);
        assert_eq!(summary.split_per_head, 1500.0);
        assert_eq!(summary.members.len(), 3);
        assert_eq!(summary.transactions.len(), 1);
        assert_eq!(summary.transactions[0].from, "Meera");

        assert!(!summary.members[0].owes_group());
        assert!(summary.members[2].owes_group());

        let meera = summary.member(3).expect("Meera should be a member");
        assert_eq!(meera.balance, -1500.0);
        assert!(summary.member(99).is_none());
    }

    #[test]
    fn test_parse_summary_with_missing_fields() {
        // A group with no expenses yet may omit amounts entirely.
        let json = r#"{"group": "New Group", "members": [], "transactions": []}"#;
        let summary: GroupSummary = serde_json::from_str(json)
            .expect("Failed to parse minimal summary");
        assert_eq!(summary.total_expense, 0.0);
        assert!(summary.members.is_empty());
    }
}
