use crate::models::GenerationRequest;

/// Build the instruction text sent to the AI model.
///
/// The base image line tells the model to write `FROM <generic_image>`
/// literally; the substitution step relies on finding that line.
pub fn build_prompt(request: &GenerationRequest, generic_image: &str) -> String {
    let language = request.language.as_str();
    let mut lines = vec![format!(
        "Generate a concise and best-practice Dockerfile for a '{}' application.",
        language
    )];

    if let Some(version) = non_empty(&request.version) {
        lines.push(format!("Use language version '{}'.", version));
    }
    if let Some(app_type) = non_empty(&request.app_type) {
        lines.push(format!("The application type is '{}'.", app_type));
    }

    lines.push(format!(
        "Use the base image '{}'. Do not use any registry prefix in the FROM line.",
        generic_image
    ));

    if let Some(deps) = request.dependencies.as_ref().filter(|d| !d.is_empty()) {
        let deps = deps.join(", ");
        let line = match language.trim().to_lowercase().as_str() {
            "python" => format!(
                "The application requires these dependencies: {}. Install them using pip, preferably from a requirements.txt file.",
                deps
            ),
            "node" => format!(
                "The application requires these dependencies: {}. Install them using npm from a package.json file.",
                deps
            ),
            _ => format!("The application requires these dependencies: {}.", deps),
        };
        lines.push(line);
    }

    if let Some(port) = request.port {
        lines.push(format!("The application needs to expose port {}.", port));
    }

    lines.push(
        "Ensure the Dockerfile copies necessary application code (e.g., using `COPY . .`).".to_string(),
    );
    lines.push("Set a reasonable default command (CMD or ENTRYPOINT) to run the application.".to_string());

    if let Some(instructions) = non_empty(&request.additional_instructions) {
        lines.push(format!("Follow these additional instructions: {}", instructions));
    }

    lines.push(String::new());
    lines.push(
        "Output only the raw Dockerfile content, without any explanation or markdown formatting like ```dockerfile."
            .to_string(),
    );

    lines.join("\n")
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
