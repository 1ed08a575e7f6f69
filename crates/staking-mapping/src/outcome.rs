use serde::Serialize;

/// What a handler produced, for receipts and logging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HandlerOutput {
    /// Id of the StakingActivity or Transfer record appended, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
    /// Users resolved by the handler.
    pub users: Vec<String>,
}
