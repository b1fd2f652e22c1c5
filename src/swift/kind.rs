/// Name returned by [`kind_name`] for raw tags outside [`NodeKind`].
pub const UNKNOWN_KIND_NAME: &str = "__UNKNOWN__";

macro_rules! node_kinds {
    ($($name:ident,)*) => {
        /// The syntactic construct a node represents.
        ///
        /// Raw values are assigned in declaration order starting from zero and never change.
        #[expect(missing_docs, reason = "variant names match the mangling grammar")]
        #[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
        pub enum NodeKind {
            $($name,)*
        }

        impl NodeKind {
            /// Every kind, indexed by its raw value.
            pub const ALL: &'static [Self] = &[$(Self::$name,)*];

            /// Stable, human-readable name of the kind.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$name => stringify!($name),)*
                }
            }

            pub(crate) const fn name_with_nul(self) -> &'static str {
                match self {
                    $(Self::$name => concat!(stringify!($name), "\0"),)*
                }
            }
        }
    };
}

node_kinds! {
    Allocator,
    AnonymousContext,
    AnyProtocolConformanceList,
    ArgumentTuple,
    AssociatedType,
    AssociatedTypeRef,
    AssociatedTypeMetadataAccessor,
    DefaultAssociatedTypeMetadataAccessor,
    AssociatedTypeWitnessTableAccessor,
    BaseWitnessTableAccessor,
    AutoClosureType,
    BoundGenericClass,
    BoundGenericEnum,
    BoundGenericStructure,
    BoundGenericProtocol,
    BoundGenericOtherNominalType,
    BoundGenericTypeAlias,
    BoundGenericFunction,
    BuiltinTypeName,
    CFunctionPointer,
    Class,
    ClassMetadataBaseOffset,
    ConcreteProtocolConformance,
    Constructor,
    CoroutineContinuationPrototype,
    Deallocator,
    DeclContext,
    DefaultArgumentInitializer,
    DependentAssociatedConformance,
    DependentAssociatedTypeRef,
    DependentGenericConformanceRequirement,
    DependentGenericParamCount,
    DependentGenericParamType,
    DependentGenericSameTypeRequirement,
    DependentGenericLayoutRequirement,
    DependentGenericSignature,
    DependentGenericType,
    DependentMemberType,
    DependentPseudogenericSignature,
    DependentProtocolConformanceRoot,
    DependentProtocolConformanceInherited,
    DependentProtocolConformanceAssociated,
    Destructor,
    DidSet,
    Directness,
    DynamicAttribute,
    DirectMethodReferenceAttribute,
    DynamicSelf,
    DynamicallyReplaceableFunctionImpl,
    DynamicallyReplaceableFunctionKey,
    DynamicallyReplaceableFunctionVar,
    Enum,
    EnumCase,
    ErrorType,
    EscapingAutoClosureType,
    NoEscapeFunctionType,
    ExistentialMetatype,
    ExplicitClosure,
    Extension,
    FieldOffset,
    FullTypeMetadata,
    Function,
    FunctionSignatureSpecialization,
    FunctionSignatureSpecializationParam,
    FunctionSignatureSpecializationParamKind,
    FunctionSignatureSpecializationParamPayload,
    FunctionType,
    GenericPartialSpecialization,
    GenericPartialSpecializationNotReAbstracted,
    GenericProtocolWitnessTable,
    GenericProtocolWitnessTableInstantiationFunction,
    ResilientProtocolWitnessTable,
    GenericSpecialization,
    GenericSpecializationNotReAbstracted,
    GenericSpecializationParam,
    InlinedGenericFunction,
    GenericTypeMetadataPattern,
    Getter,
    Global,
    GlobalGetter,
    Identifier,
    Index,
    IVarInitializer,
    IVarDestroyer,
    ImplEscaping,
    ImplConvention,
    ImplFunctionAttribute,
    ImplFunctionType,
    ImplicitClosure,
    ImplParameter,
    ImplResult,
    ImplErrorResult,
    InOut,
    InfixOperator,
    Initializer,
    KeyPathGetterThunkHelper,
    KeyPathSetterThunkHelper,
    KeyPathEqualsThunkHelper,
    KeyPathHashThunkHelper,
    LazyProtocolWitnessTableAccessor,
    LazyProtocolWitnessTableCacheVariable,
    LocalDeclName,
    MaterializeForSet,
    MergedFunction,
    Metatype,
    MetatypeRepresentation,
    Metaclass,
    MethodLookupFunction,
    ObjCMetadataUpdateFunction,
    ModifyAccessor,
    Module,
    NativeOwningAddressor,
    NativeOwningMutableAddressor,
    NativePinningAddressor,
    NativePinningMutableAddressor,
    NominalTypeDescriptor,
    NonObjCAttribute,
    Number,
    ObjCAttribute,
    ObjCBlock,
    OtherNominalType,
    OwningAddressor,
    OwningMutableAddressor,
    PartialApplyForwarder,
    PartialApplyObjCForwarder,
    PostfixOperator,
    PrefixOperator,
    PrivateDeclName,
    PropertyDescriptor,
    Protocol,
    ProtocolSymbolicReference,
    ProtocolConformance,
    ProtocolConformanceRefInTypeModule,
    ProtocolConformanceRefInProtocolModule,
    ProtocolConformanceRefInOtherModule,
    ProtocolDescriptor,
    ProtocolConformanceDescriptor,
    ProtocolList,
    ProtocolListWithClass,
    ProtocolListWithAnyObject,
    ProtocolSelfConformanceDescriptor,
    ProtocolSelfConformanceWitness,
    ProtocolSelfConformanceWitnessTable,
    ProtocolWitness,
    ProtocolWitnessTable,
    ProtocolWitnessTableAccessor,
    ProtocolWitnessTablePattern,
    ReabstractionThunk,
    ReabstractionThunkHelper,
    ReadAccessor,
    RelatedEntityDeclName,
    RetroactiveConformance,
    ReturnType,
    Shared,
    Owned,
    SILBoxType,
    SILBoxTypeWithLayout,
    SILBoxLayout,
    SILBoxMutableField,
    SILBoxImmutableField,
    Setter,
    SpecializationPassID,
    IsSerialized,
    Static,
    Structure,
    Subscript,
    Suffix,
    ThinFunctionType,
    Tuple,
    TupleElement,
    TupleElementName,
    Type,
    TypeSymbolicReference,
    TypeAlias,
    TypeList,
    TypeMangling,
    TypeMetadata,
    TypeMetadataAccessFunction,
    TypeMetadataCompletionFunction,
    TypeMetadataInstantiationCache,
    TypeMetadataInstantiationFunction,
    TypeMetadataSingletonInitializationCache,
    TypeMetadataLazyCache,
    UncurriedFunctionType,
    UnknownIndex,
    Weak,
    Unowned,
    Unmanaged,
    UnsafeAddressor,
    UnsafeMutableAddressor,
    ValueWitness,
    ValueWitnessTable,
    Variable,
    VTableThunk,
    VTableAttribute,
    WillSet,
    ReflectionMetadataBuiltinDescriptor,
    ReflectionMetadataFieldDescriptor,
    ReflectionMetadataAssocTypeDescriptor,
    ReflectionMetadataSuperclassDescriptor,
    GenericTypeParamDecl,
    CurryThunk,
    DispatchThunk,
    MethodDescriptor,
    ProtocolRequirementsBaseDescriptor,
    AssociatedConformanceDescriptor,
    DefaultAssociatedConformanceAccessor,
    BaseConformanceDescriptor,
    AssociatedTypeDescriptor,
    ThrowsAnnotation,
    EmptyList,
    FirstElementMarker,
    VariadicMarker,
    OutlinedBridgedMethod,
    OutlinedCopy,
    OutlinedConsume,
    OutlinedRetain,
    OutlinedRelease,
    OutlinedInitializeWithTake,
    OutlinedInitializeWithCopy,
    OutlinedAssignWithTake,
    OutlinedAssignWithCopy,
    OutlinedDestroy,
    OutlinedVariable,
    AssocTypePath,
    LabelList,
    ModuleDescriptor,
    ExtensionDescriptor,
    AnonymousDescriptor,
    AssociatedTypeGenericParamRef,
    SugaredOptional,
    SugaredArray,
    SugaredDictionary,
    SugaredParen,
    AccessorFunctionReference,
    OpaqueType,
    OpaqueTypeDescriptorSymbolicReference,
    OpaqueTypeDescriptor,
    OpaqueTypeDescriptorAccessor,
    OpaqueTypeDescriptorAccessorImpl,
    OpaqueTypeDescriptorAccessorKey,
    OpaqueTypeDescriptorAccessorVar,
    OpaqueReturnType,
    OpaqueReturnTypeOf,
}

impl NodeKind {
    /// Raw tag of the kind, stable across releases.
    #[must_use]
    #[expect(clippy::as_conversions, reason = "fieldless enum discriminant")]
    pub const fn raw(self) -> u32 {
        self as u32
    }

    /// Looks up a kind by its raw tag.
    #[must_use]
    pub fn from_raw(raw: u32) -> Option<Self> {
        Self::ALL.get(usize::try_from(raw).ok()?).copied()
    }

    /// Kinds that can enclose a declaration.
    #[must_use]
    pub const fn is_context(self) -> bool {
        matches!(
            self,
            Self::Allocator
                | Self::AnonymousContext
                | Self::Class
                | Self::Constructor
                | Self::Deallocator
                | Self::DefaultArgumentInitializer
                | Self::Destructor
                | Self::DidSet
                | Self::Enum
                | Self::ExplicitClosure
                | Self::Extension
                | Self::Function
                | Self::Getter
                | Self::GlobalGetter
                | Self::IVarInitializer
                | Self::IVarDestroyer
                | Self::ImplicitClosure
                | Self::Initializer
                | Self::MaterializeForSet
                | Self::ModifyAccessor
                | Self::Module
                | Self::NativeOwningAddressor
                | Self::NativeOwningMutableAddressor
                | Self::NativePinningAddressor
                | Self::NativePinningMutableAddressor
                | Self::OtherNominalType
                | Self::OwningAddressor
                | Self::OwningMutableAddressor
                | Self::Protocol
                | Self::ProtocolSymbolicReference
                | Self::ReadAccessor
                | Self::Setter
                | Self::Static
                | Self::Structure
                | Self::Subscript
                | Self::TypeSymbolicReference
                | Self::TypeAlias
                | Self::UnsafeAddressor
                | Self::UnsafeMutableAddressor
                | Self::Variable
                | Self::WillSet
                | Self::OpaqueReturnTypeOf
        )
    }

    /// Kinds that name a declaration.
    #[must_use]
    pub const fn is_decl_name(self) -> bool {
        matches!(
            self,
            Self::Identifier
                | Self::LocalDeclName
                | Self::PrivateDeclName
                | Self::RelatedEntityDeclName
                | Self::PrefixOperator
                | Self::PostfixOperator
                | Self::InfixOperator
                | Self::TypeSymbolicReference
                | Self::ProtocolSymbolicReference
        )
    }

    /// Nominal types and type aliases, which can take generic arguments.
    #[must_use]
    pub const fn is_any_generic(self) -> bool {
        matches!(
            self,
            Self::Structure
                | Self::Class
                | Self::Enum
                | Self::Protocol
                | Self::ProtocolSymbolicReference
                | Self::OtherNominalType
                | Self::TypeAlias
                | Self::TypeSymbolicReference
        )
    }

    /// Attributes that are hoisted in front of the entity they annotate.
    #[must_use]
    pub const fn is_function_attr(self) -> bool {
        matches!(
            self,
            Self::FunctionSignatureSpecialization
                | Self::GenericSpecialization
                | Self::InlinedGenericFunction
                | Self::GenericSpecializationNotReAbstracted
                | Self::GenericPartialSpecialization
                | Self::GenericPartialSpecializationNotReAbstracted
                | Self::ObjCAttribute
                | Self::NonObjCAttribute
                | Self::DynamicAttribute
                | Self::DirectMethodReferenceAttribute
                | Self::VTableAttribute
                | Self::PartialApplyForwarder
                | Self::PartialApplyObjCForwarder
                | Self::OutlinedVariable
                | Self::OutlinedBridgedMethod
                | Self::MergedFunction
                | Self::DynamicallyReplaceableFunctionImpl
                | Self::DynamicallyReplaceableFunctionKey
                | Self::DynamicallyReplaceableFunctionVar
        )
    }

    /// Requirements of a generic signature.
    #[must_use]
    pub const fn is_requirement(self) -> bool {
        matches!(
            self,
            Self::DependentGenericConformanceRequirement
                | Self::DependentGenericSameTypeRequirement
                | Self::DependentGenericLayoutRequirement
        )
    }

    /// Types and declaration contexts.
    #[must_use]
    pub const fn is_entity(self) -> bool {
        matches!(self, Self::Type) || self.is_context()
    }
}

/// Name of the kind with the given raw tag, or [`UNKNOWN_KIND_NAME`] if no such kind exists.
#[must_use]
pub fn kind_name(raw: u32) -> &'static str {
    NodeKind::from_raw(raw).map_or(UNKNOWN_KIND_NAME, NodeKind::name)
}

#[cfg(test)]
mod tests {
    use super::{NodeKind, UNKNOWN_KIND_NAME};

    #[test]
    fn test_raw_values_follow_declaration_order() {
        for (index, kind) in NodeKind::ALL.iter().enumerate() {
            assert_eq!(usize::try_from(kind.raw()).unwrap(), index);
            assert_eq!(NodeKind::from_raw(kind.raw()), Some(*kind));
        }

        assert_eq!(NodeKind::Allocator.raw(), 0);
    }

    #[test]
    fn test_kind_name() {
        assert_eq!(NodeKind::Global.name(), "Global");
        assert_eq!(NodeKind::Type.name(), "Type");
        assert_eq!(super::kind_name(NodeKind::Identifier.raw()), "Identifier");

        let past_end = u32::try_from(NodeKind::ALL.len()).unwrap();

        assert_eq!(super::kind_name(past_end), UNKNOWN_KIND_NAME);
        assert_eq!(super::kind_name(u32::MAX), UNKNOWN_KIND_NAME);
    }

    #[test]
    fn test_names_are_unique() {
        let mut names = NodeKind::ALL.iter().map(|kind| kind.name()).collect::<Vec<_>>();

        names.sort_unstable();
        names.dedup();

        assert_eq!(names.len(), NodeKind::ALL.len());
    }

    #[test]
    fn test_name_with_nul() {
        for kind in NodeKind::ALL {
            assert_eq!(kind.name_with_nul().strip_suffix('\0'), Some(kind.name()));
        }
    }

    #[test]
    fn test_predicates() {
        assert!(NodeKind::Module.is_context());
        assert!(NodeKind::Variable.is_entity());
        assert!(NodeKind::Type.is_entity());
        assert!(!NodeKind::Type.is_context());
        assert!(NodeKind::PrivateDeclName.is_decl_name());
        assert!(!NodeKind::Module.is_decl_name());
        assert!(NodeKind::TypeAlias.is_any_generic());
        assert!(NodeKind::ObjCAttribute.is_function_attr());
        assert!(!NodeKind::Function.is_function_attr());
        assert!(NodeKind::DependentGenericSameTypeRequirement.is_requirement());
        assert!(!NodeKind::DependentGenericSignature.is_requirement());
    }
}
