//! Templates: parameters, specializations and instantiation.
//!
//! # Design
//!
//! A template is a [`Callable`](crate::SymbolKind::Callable) symbol of
//! kind [`Template`](crate::TypeKind::Template). Its parameters are
//! ordinary members of its scope (so the body sees them through lexical
//! lookup), and its *body* is the member that carries the template's own
//! name.
//!
//! Instantiation:
//!
//! 1. complete the argument list from parameter defaults;
//! 2. normalize every argument (flattened, storage bits dropped);
//! 3. pick a matching specialization, if any (`specialize.rs`);
//! 4. return the cached instance for that (template, arguments) key, or
//!    deep-clone the body with parameters substituted (`substitute.rs`).
//!
//! Instances are never attached to a scope; their container is the
//! template (or specialization) they were cloned from.

mod specialize;
mod substitute;

use crate::error::{InvalidUse, SymbolResult};
use crate::symbol::{InstanceInfo, SymbolId};
use crate::transaction::LogEntry;
use crate::type_info::{DefaultArg, TypeInfo};
use crate::SymbolTable;

use substitute::Substitution;

/// Memo key of an instantiation.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstanceKey {
    /// Primary template or the selected specialization.
    pub template: SymbolId,
    /// Normalized arguments, one per parameter.
    pub args: Vec<TypeInfo>,
}

impl SymbolTable {
    /// Declare `param` as the next parameter of `template`.
    pub fn add_template_parameter(
        &mut self,
        template: SymbolId,
        param: SymbolId,
    ) -> SymbolResult<()> {
        self.require_template(template)?;
        self.require_mutable(template)?;
        if param == self.root || self.symbol(param).container.is_some() {
            return Err(InvalidUse::AlreadyAttached { symbol: param }.into());
        }
        let name = self.symbol(param).name;
        self.check_redeclaration(template, name, param)?;

        let owner = self.symbol_mut(template);
        if let Some(data) = owner.callable_mut() {
            data.template.params.push(param);
            data.scope.insert(name, param);
        }
        self.symbol_mut(param).container = Some(template);
        self.log
            .record(LogEntry::AddTemplateParameter { template, param });
        Ok(())
    }

    /// Register `specialization` as a specialization of `template`.
    pub fn add_specialization(
        &mut self,
        template: SymbolId,
        specialization: SymbolId,
    ) -> SymbolResult<()> {
        self.require_template(template)?;
        self.require_template(specialization)?;
        self.require_mutable(template)?;
        if specialization == template || self.symbol(specialization).container.is_some() {
            return Err(InvalidUse::AlreadyAttached {
                symbol: specialization,
            }
            .into());
        }
        if let Some(data) = self.symbol_mut(template).callable_mut() {
            data.template.specializations.push(specialization);
        }
        let entry = self.symbol_mut(specialization);
        entry.container = Some(template);
        if let Some(data) = entry.callable_mut() {
            data.template.primary = Some(template);
        }
        self.log.record(LogEntry::AddSpecialization {
            template,
            specialization,
        });
        Ok(())
    }

    /// Append one entry to the argument pattern of a specialization.
    pub fn add_specialization_argument(
        &mut self,
        specialization: SymbolId,
        pattern: TypeInfo,
    ) -> SymbolResult<()> {
        self.require_template(specialization)?;
        self.require_mutable(specialization)?;
        if let Some(data) = self.symbol_mut(specialization).callable_mut() {
            data.template.pattern.push(pattern);
        }
        self.log
            .record(LogEntry::AddSpecializationArgument { specialization });
        Ok(())
    }

    /// The instance of `template` for `args`, created on first use.
    #[tracing::instrument(level = "debug", skip(self, args), fields(argc = args.len()))]
    pub fn instantiate(&mut self, template: SymbolId, args: &[TypeInfo]) -> SymbolResult<SymbolId> {
        let template = self.resolve_alias(template);
        self.require_template(template)?;
        let args = self.complete_arguments(template, args)?;

        let key = match self.select_specialization(template, &args)? {
            Some((specialization, bound)) => InstanceKey {
                template: specialization,
                args: bound,
            },
            None => InstanceKey { template, args },
        };
        if let Some(&instance) = self.instances.get(&key) {
            tracing::debug!(%instance, "instance cache hit");
            return Ok(instance);
        }

        let body = self.template_body(key.template)?;
        let params = self.template_parameters(key.template).to_vec();
        let mut substitution = Substitution::new(&params, &key.args);
        let instance = self.clone_body(key.template, body, &mut substitution)?;
        self.symbol_mut(instance).instance_of = Some(InstanceInfo {
            template: key.template,
            args: key.args.clone(),
        });
        tracing::debug!(%instance, template = %key.template, "instantiated");

        self.instances.insert(key.clone(), instance);
        self.log.record(LogEntry::CacheInstance { key });
        Ok(instance)
    }

    /// Unqualified lookup of a template name followed by instantiation.
    ///
    /// `Ok(None)` when nothing is named `name`.
    pub fn template_lookup(
        &mut self,
        scope: SymbolId,
        name: &str,
        args: &[TypeInfo],
    ) -> SymbolResult<Option<SymbolId>> {
        let Some(found) = self.lookup(scope, name)? else {
            return Ok(None);
        };
        self.instantiate(found, args).map(Some)
    }

    /// Number of cached instances.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    fn require_template(&self, id: SymbolId) -> SymbolResult<()> {
        self.require_cpp("templates")?;
        if self.symbol(id).is_template() {
            Ok(())
        } else {
            Err(InvalidUse::NotATemplate { symbol: id }.into())
        }
    }

    /// Explicit arguments followed by defaults, all normalized.
    fn complete_arguments(
        &self,
        template: SymbolId,
        explicit: &[TypeInfo],
    ) -> SymbolResult<Vec<TypeInfo>> {
        let params = self.template_parameters(template);
        if explicit.len() > params.len() {
            return Err(InvalidUse::TooManyTemplateArguments {
                expected: params.len(),
                found: explicit.len(),
            }
            .into());
        }
        let mut args: Vec<TypeInfo> = explicit
            .iter()
            .map(|arg| self.normalize_argument(arg))
            .collect();
        for (index, &param) in params.iter().enumerate().skip(explicit.len()) {
            let Some(DefaultArg::Type(default)) = &self.symbol(param).type_info.default else {
                return Err(InvalidUse::MissingTemplateArgument { index }.into());
            };
            let earlier = Substitution::new(&params[..index], &args);
            let filled = earlier.apply(default);
            args.push(self.normalize_argument(&filled));
        }
        Ok(args)
    }

    pub(crate) fn normalize_argument(&self, arg: &TypeInfo) -> TypeInfo {
        self.flatten_type(arg).normalized()
    }

    /// The member of `template` that carries the template's name.
    fn template_body(&self, template: SymbolId) -> SymbolResult<SymbolId> {
        let symbol = self.symbol(template);
        let params = self.template_parameters(template);
        symbol
            .scope()
            .and_then(|scope| {
                scope
                    .named(symbol.name)
                    .iter()
                    .copied()
                    .find(|member| !params.contains(member))
            })
            .ok_or_else(|| InvalidUse::NoTemplateBody { template }.into())
    }
}
