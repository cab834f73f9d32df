use crate::api::TEMPLATE_DATA;
use crate::args::TemplateArgs;
use crate::commands::Out;
use crate::{utils, Result};

/// Writes the sample CSV to `--out`, or puts it in the body to be printed.
///
/// # Errors
/// Returns an error if the file cannot be written.
pub async fn template(args: &TemplateArgs) -> Result<Out<()>> {
    match args.out() {
        Some(path) => {
            utils::write(path, TEMPLATE_DATA).await?;
            Ok(format!("Wrote the template to '{}'", path.display()).into())
        }
        None => Ok(Out::new_message("Template CSV").with_body(TEMPLATE_DATA)),
    }
}
