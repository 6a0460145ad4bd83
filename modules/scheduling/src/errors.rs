//! Closed catalog of error kinds, each carrying its transport status.

slotkeeper_errors_macro::declare_errors! {
    path = "gts/errors.json",
    vis = "pub"
}
