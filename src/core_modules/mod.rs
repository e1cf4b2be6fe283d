pub mod border;
pub mod feature_inspector;
pub mod image_loader;
pub mod stitcher;
pub mod viewer;

#[cfg(test)]
pub(crate) mod test_support;
