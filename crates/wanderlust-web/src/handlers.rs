pub mod listings;
pub mod root;

pub use listings::{
    create_handler, delete_handler, edit_form_handler, index_handler, new_form_handler,
    show_handler, update_handler,
};
pub use root::{not_found_handler, root_handler};
