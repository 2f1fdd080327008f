use crate::registry::Registry;

#[inline(never)]
fn push_str(out: &mut String, s: &str) {
    out.push_str(s);
}

/// Render the program name followed by every registered option's help
/// block, in registration order.
#[cold]
pub(crate) fn render_help(registry: &Registry) -> String {
    let mut out = String::new();
    macro_rules! w {
        ($($e:expr),*) => {{
            $(push_str(&mut out, $e);)*
        }};
    }

    w!(registry.program_name(), "\n\n", "Options:\n");
    for entity in registry.entities() {
        entity.help_into(&mut out);
    }
    out
}
