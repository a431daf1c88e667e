// Decimal columns (quantity, entry_price) are stored as TEXT and parsed
// into rust_decimal at the model boundary.

diesel::table! {
    users (id) {
        id -> Text,
        email -> Text,
        name -> Text,
        password_hash -> Text,
        role -> Text,
        is_active -> Bool,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    holdings (id) {
        id -> Text,
        user_id -> Text,
        symbol -> Text,
        quantity -> Text,
        entry_price -> Text,
        purchased_at -> Nullable<Date>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

diesel::joinable!(holdings -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(holdings, users);
