use crate::{
    clients::UploadFile,
    render::{escape_html, file_type_icon, format_file_size},
    ui::actions::ActionKind,
};

/// render_file_preview
///
/// A tile for one pending upload. `index` is the file's position in the widget's
/// selection and is what the remove button reports back.
pub fn render_file_preview(file: &UploadFile, index: usize) -> String {
    let kind = if file.content_type.starts_with("image/") {
        "image"
    } else if file.content_type.starts_with("video/") {
        "video"
    } else {
        "file"
    };
    format!(
        r#"<div class="file-preview-item {kind}" data-index="{index}">
<div class="file-preview-body"><i class="fas {icon} fa-3x"></i><span class="file-name">{name}</span><span class="file-size">{size}</span></div>
<button class="remove-file" data-action="{remove}" data-index="{index}"><i class="fas fa-times"></i></button>
</div>"#,
        icon = file_type_icon(&file.content_type),
        name = escape_html(&file.name),
        size = format_file_size(file.size()),
        remove = ActionKind::RemoveFile.as_str(),
    )
}

pub fn render_preview_list(files: &[UploadFile]) -> String {
    files
        .iter()
        .enumerate()
        .map(|(index, file)| render_file_preview(file, index))
        .collect::<Vec<_>>()
        .join("\n")
}
