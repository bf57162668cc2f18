//! Port traits abstracting the plugin's external collaborators.

use fixvis_types::FixRecord;

/// BUILD-file attribute editor (buildozer).
///
/// `args` is the command followed by the targets it applies to, e.g.
/// `["print visibility", "//a:a"]`. Returns raw stdout.
pub trait LabelEditor {
    fn run(&self, args: &[&str]) -> anyhow::Result<Vec<u8>>;
}

impl<E: LabelEditor + ?Sized> LabelEditor for &E {
    fn run(&self, args: &[&str]) -> anyhow::Result<Vec<u8>> {
        (**self).run(args)
    }
}

/// Decides whether a fix should be applied automatically.
///
/// Any failure to obtain an answer must be reported as `false`.
pub trait Confirm {
    fn confirm(&self, record: &FixRecord) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&FixRecord) -> bool,
{
    fn confirm(&self, record: &FixRecord) -> bool {
        self(record)
    }
}
