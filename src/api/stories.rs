//! Story report listing and creation.
//!
//! Both operations capture failures: callers always get a `NormalizedResult`.

use super::client::ApiClient;
use super::normalize::{self, NormalizedResult};
use super::operation::Operation;
use super::transport::{FormField, FormValue, RequestBody, Transport};
use super::types::{NewReport, ReportQuery};

/// List story reports.
///
/// GET /stories?page=&size=&location=. `ok` reflects the body's `error`
/// flag; `data` is `listStory`, or `[]` when absent or on failure.
pub async fn get_all_reports<T: Transport>(
    client: &ApiClient<T>,
    query: &ReportQuery,
) -> NormalizedResult {
    let op = Operation::ListReports;
    let url = client.endpoints().url_with_query(op, &query.to_pairs());
    let request = client.request(op, url, RequestBody::Empty);
    client.captured(op, Ok(request), normalize::report_list).await
}

/// Create a story report with a photo.
///
/// POST /stories as multipart/form-data. `lat` and `lon` are only sent when
/// present.
pub async fn store_new_report<T: Transport>(
    client: &ApiClient<T>,
    report: &NewReport,
) -> NormalizedResult {
    let op = Operation::StoreReport;
    let body = RequestBody::Multipart(report_form(report));
    let request = client.request(op, client.endpoints().url(op), body);
    client.captured(op, Ok(request), normalize::stored_report).await
}

/// Multipart fields for a new report, in submission order.
pub fn report_form(report: &NewReport) -> Vec<FormField> {
    let mut fields = vec![
        FormField::text("description", report.description.as_str()),
        FormField {
            name: "photo".to_string(),
            value: FormValue::File {
                bytes: report.photo.bytes.clone(),
                file_name: report.photo.file_name.clone(),
                mime_type: report.photo.mime_type.clone(),
            },
        },
    ];
    if let Some(lat) = report.lat {
        fields.push(FormField::text("lat", lat.to_string()));
    }
    if let Some(lon) = report.lon {
        fields.push(FormField::text("lon", lon.to_string()));
    }
    fields
}
