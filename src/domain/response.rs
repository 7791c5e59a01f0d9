use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::value::{LocalMessageId, MessageStatus, RemoteMessageId, RemotePackageId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MessageOutcome {
    pub remote_message_id: RemoteMessageId,
    pub status: MessageStatus,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TransmissionResult {
    pub remote_package_id: Option<RemotePackageId>,
    pub remote_message_ids: BTreeMap<LocalMessageId, MessageOutcome>,
    pub error_message: Option<String>,
    pub elapsed_seconds: Option<f64>,
}

impl TransmissionResult {
    pub fn outcome(&self, local_id: LocalMessageId) -> Option<&MessageOutcome> {
        self.remote_message_ids.get(&local_id)
    }
}
