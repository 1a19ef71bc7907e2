//! Instruction templates for the two conversion directions.
//!
//! The mapping rules live here as prose for the backend to follow; nothing in
//! wfconv checks that the reply obeys them.

use minijinja::{Environment, context};
use wfconv_core::platform::Platform;

const MAKE_TO_N8N: &str = r#"You are an expert automation developer tool. Convert the Make.com (formerly Integromat) workflow JSON below into an equivalent n8n workflow. Follow the schema and conventions of the n8n platform.

**Key Mappings:**
- Make.com 'modules' become n8n 'nodes'.
- A module's 'id' and 'label' map to the node's 'id' and 'name'.
- A module's 'router' / module type maps to the n8n node 'type'. For example, a 'builtin.BasicTool' whose 'module' is 'json.parse' could become an n8n node of type 'n8n-nodes-base.json'. Use your best judgement for types not listed here.
- The blueprint's 'connections' map to the n8n 'connections' object, wiring the nodes together correctly.
- A module's 'parameters' carry over as the node's 'parameters'.

Respond with ONLY the raw JSON object. No surrounding text, no explanations, no markdown ```json fences.

Here is the Make.com JSON:
{{ source_json }}
"#;

const N8N_TO_MAKE: &str = r#"You are an expert automation developer tool. Convert the n8n workflow JSON below into an equivalent Make.com (formerly Integromat) blueprint. Follow the schema and conventions of the Make.com platform.

**Key Mappings:**
- n8n 'nodes' become Make.com 'modules' inside a 'flow' array. The 'flow' array must contain at least one element.
- A node's 'id', 'name' and 'type' map to the module's 'id', 'label' and 'router'. For example, an n8n node of type 'n8n-nodes-base.start' could become a module with router 'builtin.trigger'. Use your best judgement for types not listed here.
- The n8n 'connections' object becomes the blueprint's 'connections' array.
- A node's 'parameters' carry over as the module's 'parameters'.
- Wrap the result in a standard Make.com blueprint with 'name', 'flow' and 'metadata' keys.

Respond with ONLY the raw JSON object. No surrounding text, no explanations, no markdown ```json fences.

Here is the n8n JSON:
{{ source_json }}
"#;

/// Template name and source for converting *into* `target`.
fn template_for(target: Platform) -> (&'static str, &'static str) {
    match target {
        Platform::N8n => ("make_to_n8n", MAKE_TO_N8N),
        Platform::Make => ("n8n_to_make", N8N_TO_MAKE),
    }
}

/// Renders the instruction that converts `source_json` into `target`'s schema.
///
/// The source text is embedded verbatim.
pub fn render_conversion_prompt(
    source_json: &str,
    target: Platform,
) -> Result<String, minijinja::Error> {
    let (name, source) = template_for(target);

    let mut env = Environment::new();
    env.add_template(name, source)?;
    env.get_template(name)?
        .render(context! { source_json => source_json })
}
