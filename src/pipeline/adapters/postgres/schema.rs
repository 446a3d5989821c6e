//! Diesel schema for the log queue and warehouse.

diesel::table! {
    /// Records awaiting acknowledgement.
    log_queue (record_id) {
        /// Record identifier.
        #[max_length = 100]
        record_id -> Varchar,
        /// Structured payload.
        payload -> Jsonb,
        /// Publishing source.
        #[max_length = 255]
        source -> Varchar,
        /// Publish timestamp.
        published_at -> Timestamptz,
        /// Deliveries so far.
        attempts -> Int4,
        /// Lease handle of the latest delivery.
        ack_id -> Nullable<Uuid>,
        /// When the record may be pulled again.
        visible_at -> Timestamptz,
        /// Publish order.
        enqueued_seq -> Int8,
    }
}

diesel::table! {
    /// Stored log records.
    log_records (record_id) {
        /// Record identifier.
        #[max_length = 100]
        record_id -> Varchar,
        /// Structured payload.
        payload -> Jsonb,
        /// Publishing source.
        #[max_length = 255]
        source -> Varchar,
        /// Publish timestamp.
        published_at -> Timestamptz,
        /// Storage timestamp.
        stored_at -> Timestamptz,
    }
}
