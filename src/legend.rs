//! # Legend
//!
//! A short block after `</VTKFile>` that maps the numbers stored in the arrays back to
//! the names used in the model:
//!
//! ```text
//! <gprMax>
//! <Material name="free_space">1</Material>
//! <PML name="PML boundary region">1</PML>
//! <Sources_Receivers name="rx1">2</Sources_Receivers>
//! </gprMax>
//! ```
//!
//! VTK readers stop at the closing `VTKFile` element and never see it.

use crate::prelude::*;

/// name of the element wrapping the legend
pub const LEGEND_ROOT: &str = "gprMax";

pub(crate) const MATERIAL: &str = "Material";
pub(crate) const ABSORBING: &str = "PML";
pub(crate) const ANNOTATION: &str = "Sources_Receivers";

/// name written for the absorbing region entry
pub(crate) const ABSORBING_NAME: &str = "PML boundary region";

/// tag of cells inside the absorbing region
pub(crate) const ABSORBING_TAG: i8 = 1;

/// Write the legend for a geometry view.
///
/// Materials are always listed. When `annotations` is given (cell views) the absorbing
/// region and every source / receiver follow with their tags.
pub fn write_legend<W: Write>(
    writer: &mut Writer<W>,
    materials: &[Material],
    annotations: Option<&Annotations>,
) -> Result<(), Error> {
    writer.inner().write_all(b"\n")?;
    writer.write_event(Event::Start(BytesStart::new(LEGEND_ROOT)))?;
    appended::newline(writer)?;

    for material in materials {
        write_entry(writer, MATERIAL, &material.name, &material.num_id.to_string())?;
    }

    if let Some(annotations) = annotations {
        write_entry(writer, ABSORBING, ABSORBING_NAME, &ABSORBING_TAG.to_string())?;

        for (tag, annotation) in annotations.tagged() {
            write_entry(writer, ANNOTATION, &annotation.name, &tag.to_string())?;
        }
    }

    writer.write_event(Event::End(BytesEnd::new(LEGEND_ROOT)))?;
    appended::newline(writer)?;

    Ok(())
}

fn write_entry<W: Write>(
    writer: &mut Writer<W>,
    element: &str,
    name: &str,
    value: &str,
) -> Result<(), Error> {
    let mut start = BytesStart::new(element);
    start.push_attribute(("name", name));

    writer.write_event(Event::Start(start))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new(element)))?;
    appended::newline(writer)?;

    Ok(())
}
