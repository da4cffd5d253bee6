//! Name-based dispatch for the `WebFrame` prototype.

use crate::script::{IsolatedScript, ScriptExecutionType};
use crate::value::{Arguments, BindingValue};
use crate::web_frame::WebFrame;
use crate::BindingError;
use framekit_core::{RoutingId, WorldId};
use tracing::trace;

/// Methods exposed on the prototype.
pub const METHOD_NAMES: &[&str] = &[
    "setName",
    "setZoomLevel",
    "getZoomLevel",
    "setZoomFactor",
    "getZoomFactor",
    "setVisualZoomLevelLimits",
    "setLayoutZoomLevelLimits",
    "allowGuestViewElementDefinition",
    "getWebFrameId",
    "setSpellCheckProvider",
    "insertText",
    "insertCSS",
    "executeJavaScript",
    "executeJavaScriptInIsolatedWorld",
    "setIsolatedWorldSecurityOrigin",
    "setIsolatedWorldContentSecurityPolicy",
    "setIsolatedWorldHumanReadableName",
    "getResourceUsage",
    "clearCache",
    "getFrameForSelector",
    "findFrameByName",
    "findFrameByRoutingId",
];

/// Read-only properties exposed on the prototype.
pub const PROPERTY_NAMES: &[&str] = &[
    "opener",
    "parent",
    "top",
    "firstChild",
    "nextSibling",
    "routingId",
];

/// Routing id reported for a window whose frame is gone.
const NO_FRAME_ID: f64 = -1.0;

impl WebFrame {
    /// Read a prototype property. Unknown names read as `undefined`.
    pub fn get_property(&self, name: &str) -> BindingValue {
        match name {
            "opener" => BindingValue::from_frame(self.opener()),
            "parent" => BindingValue::from_frame(self.parent()),
            "top" => BindingValue::from_frame(self.top()),
            "firstChild" => BindingValue::from_frame(self.first_child()),
            "nextSibling" => BindingValue::from_frame(self.next_sibling()),
            "routingId" => self
                .routing_id()
                .map_or(BindingValue::Null, |id| BindingValue::Number(id.raw() as f64)),
            _ => BindingValue::Undefined,
        }
    }

    /// Call a prototype method with embedder arguments.
    pub fn call(&self, method: &str, values: &[BindingValue]) -> Result<BindingValue, BindingError> {
        trace!(method, argc = values.len(), "webFrame call");
        let mut args = Arguments::new(method, values);

        let result = match method {
            "setName" => {
                self.set_name(&args.string()?);
                BindingValue::Undefined
            }
            "setZoomLevel" => BindingValue::Number(self.set_zoom_level(args.number()?)),
            "getZoomLevel" => BindingValue::Number(self.get_zoom_level()),
            "setZoomFactor" => BindingValue::Number(self.set_zoom_factor(args.number()?)),
            "getZoomFactor" => BindingValue::Number(self.get_zoom_factor()),
            "setVisualZoomLevelLimits" => {
                let (min, max) = (args.number()?, args.number()?);
                self.set_visual_zoom_level_limits(min, max);
                BindingValue::Undefined
            }
            "setLayoutZoomLevelLimits" => {
                let (min, max) = (args.number()?, args.number()?);
                self.set_layout_zoom_level_limits(min, max);
                BindingValue::Undefined
            }
            "allowGuestViewElementDefinition" => {
                let context = args.object()?;
                let register = args.function()?;
                self.allow_guest_view_element_definition(&context, &register);
                BindingValue::Undefined
            }
            "getWebFrameId" => {
                let window = args.object()?;
                match self.web_frame_id(&window)? {
                    Some(id) => BindingValue::Number(id.raw() as f64),
                    None => BindingValue::Number(NO_FRAME_ID),
                }
            }
            "setSpellCheckProvider" => {
                let language = args.string()?;
                let provider = args.object()?;
                self.set_spell_check_provider(&language, provider)?;
                BindingValue::Undefined
            }
            "insertText" => {
                self.insert_text(&args.string()?);
                BindingValue::Undefined
            }
            "insertCSS" => {
                self.insert_css(&args.string()?);
                BindingValue::Undefined
            }
            "executeJavaScript" => {
                let code = args.string()?;
                let user_gesture = args.optional_bool()?.unwrap_or(false);
                let callback = args.optional_function()?;
                self.execute_java_script(&code, user_gesture, callback);
                BindingValue::Undefined
            }
            "executeJavaScriptInIsolatedWorld" => {
                let world = WorldId::new(args.integer()?);
                let sources = IsolatedScript::parse_list(args.json_array()?)?;
                let user_gesture = args.optional_bool()?.unwrap_or(false);
                let execution_type = match args.optional_string()? {
                    Some(name) => name.parse::<ScriptExecutionType>()?,
                    None => ScriptExecutionType::default(),
                };
                let callback = args.optional_function()?;
                self.execute_java_script_in_isolated_world(
                    world,
                    sources,
                    user_gesture,
                    execution_type,
                    callback,
                );
                BindingValue::Undefined
            }
            "setIsolatedWorldSecurityOrigin" => {
                let world = WorldId::new(args.integer()?);
                self.set_isolated_world_security_origin(world, &args.string()?);
                BindingValue::Undefined
            }
            "setIsolatedWorldContentSecurityPolicy" => {
                let world = WorldId::new(args.integer()?);
                self.set_isolated_world_content_security_policy(world, &args.string()?);
                BindingValue::Undefined
            }
            "setIsolatedWorldHumanReadableName" => {
                let world = WorldId::new(args.integer()?);
                self.set_isolated_world_human_readable_name(world, &args.string()?);
                BindingValue::Undefined
            }
            "getResourceUsage" => {
                let stats = serde_json::to_value(self.get_resource_usage())
                    .map_err(|e| BindingError::Script(e.to_string()))?;
                BindingValue::Json(stats)
            }
            "clearCache" => {
                self.clear_cache();
                BindingValue::Undefined
            }
            "getFrameForSelector" => BindingValue::from_frame(self.frame_for_selector(&args.string()?)),
            "findFrameByName" => BindingValue::from_frame(self.find_frame_by_name(&args.string()?)),
            "findFrameByRoutingId" => {
                let id = RoutingId::new(args.integer()?);
                BindingValue::from_frame(self.find_frame_by_routing_id(id))
            }
            _ => {
                return Err(BindingError::type_error(
                    "a WebFrame method",
                    format!("'{method}'"),
                ))
            }
        };

        Ok(result)
    }
}
