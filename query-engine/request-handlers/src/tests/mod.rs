mod helpers;
mod variables;
