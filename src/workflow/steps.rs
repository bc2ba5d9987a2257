//! The four READY form pages, in the order the server expects them.
use crate::form::Form;
use crate::params::{format_degrees, DerivedFields, JobParameters};

/// Page the archive-trajectory flow starts from; step 1's referer.
pub const RUN_TYPE_PAGE: &str = "/hypub-bin/trajtype.pl?runtype=archive";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStep {
    SelectRunType,
    SelectSource,
    SelectMetFile,
    SubmitJob,
}

impl FormStep {
    /// Pages that only build up server-side state before the submission.
    pub const PREPARATION: [FormStep; 3] = [
        FormStep::SelectRunType,
        FormStep::SelectSource,
        FormStep::SelectMetFile,
    ];

    pub fn number(self) -> u8 {
        match self {
            FormStep::SelectRunType => 1,
            FormStep::SelectSource => 2,
            FormStep::SelectMetFile => 3,
            FormStep::SubmitJob => 4,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            FormStep::SelectRunType => "/hypub-bin/trajasrc.pl",
            FormStep::SelectSource => "/hypub-bin/trajsrcm.pl",
            FormStep::SelectMetFile => "/hypub-bin/traj1.pl",
            FormStep::SubmitJob => "/hypub-bin/traj2.pl",
        }
    }

    /// Each page is posted from the previous one.
    pub fn referer_path(self) -> &'static str {
        match self {
            FormStep::SelectRunType => RUN_TYPE_PAGE,
            FormStep::SelectSource => FormStep::SelectRunType.path(),
            FormStep::SelectMetFile => FormStep::SelectSource.path(),
            FormStep::SubmitJob => FormStep::SelectMetFile.path(),
        }
    }

    pub fn form(self, params: &JobParameters, derived: &DerivedFields) -> Form {
        match self {
            FormStep::SelectRunType => Form::new().field("nsrc", "1").field("trjtype", "1"),
            FormStep::SelectSource => source_form(params),
            FormStep::SelectMetFile => {
                Form::new().field("mfile", derived.data_file_name.as_str())
            }
            FormStep::SubmitJob => submit_form(params),
        }
    }
}

fn source_form(params: &JobParameters) -> Form {
    let lat = params.latitude_hemisphere();
    let lon = params.longitude_hemisphere();
    Form::new()
        .field("metdata", "GDAS1")
        .field("SOURCELOC", "decdegree")
        .field("Lat", lat.magnitude)
        .field("Latns", lat.hemisphere)
        .field("Lon", lon.magnitude)
        .field("Lonew", lon.hemisphere)
        .empty_fields(&["Latd", "Latm", "Lats"])
        .field("Latdns", "N")
        .empty_fields(&["Lond", "Lonm", "Lons"])
        .field("Londew", "W")
        .empty_fields(&["CITYNAME", "WMO"])
}

/// Full run definition. Coordinates are signed here, not hemisphere-split;
/// output and plot options are pinned to a configuration the server accepts.
fn submit_form(params: &JobParameters) -> Form {
    let options = &params.options;
    Form::new()
        .field("direction", options.direction.as_form_value())
        .field("vertical", "0")
        .field("Start year", format!("{:02}", params.start_year))
        .field("Start month", params.start_month.to_string())
        .field("Start day", params.start_day.to_string())
        .field("Start hour", params.start_hour.to_string())
        .field("duration", options.duration_hours.to_string())
        .field("repeatsrc", "0")
        .field("ntrajs", "24")
        .field("Source lat", format_degrees(params.latitude))
        .field("Source lon", format_degrees(params.longitude))
        .empty_fields(&["Source lat2", "Source lon2", "Source lat3", "Source lon3"])
        .field("Midlayer height", "No")
        .field("Source hgt1", options.source_height_m.to_string())
        .field("Source hunit", "0")
        .field("Source hgt2", "0")
        .field("Source hgt3", "0")
        .field("gis", "1")
        .field("gsize", "96")
        .field("Zoom Factor", "70")
        .field("projection", "0")
        .field("Vertical Unit", "1")
        .field("Label Interval", "6")
        .field("color", "Yes")
        .field("colortype", "Yes")
        .field("pltsrc", "1")
        .field("circle", "-1")
        .field("county", "arlmap")
        .field("psfile", "No")
        .field("pdffile", "Yes")
        .field("mplot", "YES")
        .field("rain", "1")
}
