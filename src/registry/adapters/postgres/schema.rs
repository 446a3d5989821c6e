//! Diesel schema for agent card persistence.

diesel::table! {
    /// Registered agent cards.
    agent_cards (seq) {
        /// Insertion sequence, used for stable listing order.
        seq -> Int8,
        /// Unique agent name.
        #[max_length = 100]
        name -> Varchar,
        /// Full card as JSONB.
        card -> Jsonb,
        /// Registration timestamp.
        registered_at -> Timestamptz,
    }
}
