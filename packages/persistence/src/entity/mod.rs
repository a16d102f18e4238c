pub mod flavor;
pub mod flavor_extra_spec;
pub mod flavor_project;
