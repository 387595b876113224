table! {
    book (id) {
        id -> Integer,
        title -> Text,
        author -> Text,
        genre -> Text,
        cover_image -> Nullable<Text>,
        reading_status -> Nullable<Text>,
    }
}

table! {
    ownership (user_id, book_id) {
        user_id -> Integer,
        book_id -> Integer,
    }
}

table! {
    rating (id) {
        id -> Integer,
        value -> Integer,
        book_id -> Integer,
    }
}

table! {
    review (id) {
        id -> Integer,
        content -> Text,
        book_id -> Integer,
    }
}

table! {
    session (token) {
        token -> Text,
        user_id -> Integer,
        created_at -> Timestamp,
    }
}

table! {
    user (id) {
        id -> Integer,
        name -> Text,
        hash -> Binary,
        salt -> Binary,
    }
}

joinable!(ownership -> book (book_id));
joinable!(ownership -> user (user_id));
joinable!(rating -> book (book_id));
joinable!(review -> book (book_id));
joinable!(session -> user (user_id));

allow_tables_to_appear_in_same_query!(
    book,
    ownership,
    rating,
    review,
    session,
    user,
);
