//! Diesel schema definitions for InfraPulse server.

diesel::table! {
    organizations (id) {
        id -> Text,
        name -> Text,
        slug -> Text,
        created_at -> Timestamp,
    }
}

diesel::table! {
    firewalls (id) {
        id -> Text,
        client_id -> Text,
        ip_address -> Nullable<Text>,
        firmware_version -> Nullable<Text>,
        make -> Nullable<Text>,
        model -> Nullable<Text>,
        notes -> Nullable<Text>,
        sanity_icon -> Nullable<Text>,
        status -> Nullable<Text>,
        risk -> Nullable<Text>,
        solution -> Nullable<Text>,
        weight -> Nullable<Double>,
        updated_at -> Timestamp,
    }
}

diesel::table! {
    switches (id) {
        id -> Text,
        client_id -> Text,
        ip_address -> Nullable<Text>,
        firmware_version -> Nullable<Text>,
        make -> Nullable<Text>,
        model -> Nullable<Text>,
        notes -> Nullable<Text>,
        sanity_icon -> Nullable<Text>,
        status -> Nullable<Text>,
        risk -> Nullable<Text>,
        solution -> Nullable<Text>,
        weight -> Nullable<Double>,
        updated_at -> Timestamp,
    }
}

diesel::joinable!(firewalls -> organizations (client_id));
diesel::joinable!(switches -> organizations (client_id));

diesel::allow_tables_to_appear_in_same_query!(organizations, firewalls, switches,);
