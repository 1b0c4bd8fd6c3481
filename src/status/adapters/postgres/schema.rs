//! Diesel schema for review-track status persistence.

diesel::table! {
    /// Current state of each track of each task.
    task_track_states (task_id, track) {
        /// Task identifier.
        task_id -> Uuid,
        /// Track identifier.
        #[max_length = 16]
        track -> Varchar,
        /// Current track state.
        #[max_length = 16]
        state -> Varchar,
        /// Remark of the last committed transition.
        remark -> Nullable<Text>,
        /// Last write timestamp.
        changed_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only audit records of committed transitions.
    track_audit_records (id) {
        /// Sequence-assigned record identifier.
        id -> Int8,
        /// Task identifier.
        task_id -> Uuid,
        /// Track identifier.
        #[max_length = 16]
        track -> Varchar,
        /// State before the transition.
        #[max_length = 16]
        old_state -> Varchar,
        /// State after the transition.
        #[max_length = 16]
        new_state -> Varchar,
        /// Justification for the transition.
        remark -> Text,
        /// Caller identity.
        actor -> Text,
        /// Transition timestamp.
        changed_at -> Timestamptz,
        /// Chained SHA-256 digest.
        #[max_length = 64]
        digest -> Varchar,
        /// Digest of the preceding record on the same key.
        #[max_length = 64]
        previous_digest -> Nullable<Varchar>,
    }
}
