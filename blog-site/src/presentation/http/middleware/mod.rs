pub(crate) mod body_limit;
pub(crate) mod trace;
