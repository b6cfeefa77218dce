use poi_dom::{DomError, DomNode};
use poi_traits::{ObserverHost, Teardown};

/// Calls `on_resize` whenever `target` changes size.
pub fn watch_resize<N: DomNode>(
    host: &dyn ObserverHost<N>,
    target: &N,
    on_resize: impl FnMut() + 'static,
) -> Result<Teardown, DomError> {
    let teardown = host.observe_resize(target, Box::new(on_resize))?;
    log::debug!("resize watch attached to <{}>", target.tag_name());
    Ok(teardown)
}
