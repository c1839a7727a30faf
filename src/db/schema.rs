// Shared by the SQLite and MySQL dialects; both store text columns.

diesel::table! {
    kv_pairs (pair_key) {
        pair_key -> Text,
        pair_value -> Text,
        updated_at -> Text,
    }
}
